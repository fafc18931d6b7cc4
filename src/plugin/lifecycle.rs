//! Lifecycle drivers for transform and action plugins.
//!
//! Hosts may drive plugins directly through the capability traits; these
//! helpers keep the ordering guarantees in one place: `init` before every
//! `process_row`, every `process_row` before `dispose`, and `dispose`
//! exactly once per run even when the run stops early.

use crate::core::{now, Row, Timestamp, Value};
use crate::plugin::interface::{ActionPlugin, PluginError, PluginResult, TransformPlugin};
use serde::{Deserialize, Serialize};

/// Transform lifecycle state for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformState {
    /// Created, `init` not yet called
    Constructed,
    /// `init` succeeded
    Initialized,
    /// At least one row processed
    Processing,
    /// `dispose` called (terminal)
    Disposed,
}

/// Action lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionState {
    /// Created, no parameters set through the driver
    Constructed,
    /// Parameters set
    Configured,
    /// `execute` returned
    Executed,
}

/// Counters for a finished transform run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Rows handed to `process_row`
    pub rows_in: usize,
    /// Rows emitted downstream
    pub rows_out: usize,
    /// Rows dropped by the transform
    pub rows_dropped: usize,
    /// Run start
    pub started_at: Timestamp,
    /// Run end
    pub finished_at: Timestamp,
}

/// One run of a transform.
///
/// Dropping an unfinished run disposes the plugin, so an early return or a
/// panic in the host still releases the plugin's resources.
pub struct TransformRun<'a> {
    plugin: &'a mut dyn TransformPlugin,
    state: TransformState,
    rows_in: usize,
    rows_out: usize,
    started_at: Timestamp,
}

impl<'a> TransformRun<'a> {
    /// Begin tracking a run; nothing is called on the plugin yet.
    pub fn new(plugin: &'a mut dyn TransformPlugin) -> Self {
        Self {
            plugin,
            state: TransformState::Constructed,
            rows_in: 0,
            rows_out: 0,
            started_at: now(),
        }
    }

    /// Current state.
    pub fn state(&self) -> TransformState {
        self.state
    }

    /// Call `init`.
    pub fn start(&mut self) -> PluginResult<()> {
        tracing::debug!(plugin_id = self.plugin.identifier(), "initializing transform");
        self.started_at = now();
        self.plugin.init()?;
        self.state = TransformState::Initialized;
        Ok(())
    }

    /// Pass one row through `process_row`.
    ///
    /// Fails without calling the plugin unless `start` succeeded.
    pub fn process(&mut self, row: Row) -> PluginResult<Option<Row>> {
        if !matches!(self.state, TransformState::Initialized | TransformState::Processing) {
            return Err(PluginError::new(format!(
                "cannot process a row in state {:?}; init has not succeeded",
                self.state
            )));
        }
        self.state = TransformState::Processing;
        self.rows_in += 1;
        let out = self.plugin.process_row(row)?;
        if out.is_some() {
            self.rows_out += 1;
        }
        Ok(out)
    }

    /// Call `dispose` and close the run.
    pub fn finish(mut self) -> PluginResult<RunStats> {
        self.dispose()?;
        Ok(RunStats {
            rows_in: self.rows_in,
            rows_out: self.rows_out,
            rows_dropped: self.rows_in - self.rows_out,
            started_at: self.started_at,
            finished_at: now(),
        })
    }

    fn dispose(&mut self) -> PluginResult<()> {
        if self.state == TransformState::Disposed {
            return Ok(());
        }
        self.state = TransformState::Disposed;
        tracing::debug!(
            plugin_id = self.plugin.identifier(),
            rows_in = self.rows_in,
            rows_out = self.rows_out,
            "disposing transform"
        );
        self.plugin.dispose()
    }
}

impl Drop for TransformRun<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            tracing::warn!(
                plugin_id = self.plugin.identifier(),
                error = %e,
                "dispose failed for abandoned transform run"
            );
        }
    }
}

/// Run `rows` through a transform and collect the emitted rows.
///
/// `dispose` is called exactly once, also when `init` or a row fails; the
/// first error wins.
pub fn run_transform<I>(plugin: &mut dyn TransformPlugin, rows: I) -> PluginResult<Vec<Row>>
where
    I: IntoIterator<Item = Row>,
{
    let mut run = TransformRun::new(plugin);

    let outcome = run.start().and_then(|()| {
        let mut emitted = Vec::new();
        for row in rows {
            if let Some(out) = run.process(row)? {
                emitted.push(out);
            }
        }
        Ok(emitted)
    });

    let finished = run.finish();
    let emitted = outcome?;
    let stats = finished?;

    tracing::debug!(
        rows_in = stats.rows_in,
        rows_out = stats.rows_out,
        rows_dropped = stats.rows_dropped,
        "transform run finished"
    );
    Ok(emitted)
}

/// Drives an action through configuration and execution.
pub struct ActionRun<'a> {
    plugin: &'a mut dyn ActionPlugin,
    state: ActionState,
    executions: usize,
}

impl<'a> ActionRun<'a> {
    /// Wrap an action.
    pub fn new(plugin: &'a mut dyn ActionPlugin) -> Self {
        Self {
            plugin,
            state: ActionState::Constructed,
            executions: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Number of `execute` calls so far.
    pub fn executions(&self) -> usize {
        self.executions
    }

    /// Set a parameter. Allowed in any state, including after `execute`.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.plugin.set_parameter(name, value.into());
        self.state = ActionState::Configured;
        self
    }

    /// Call `execute`. Faults propagate unchanged.
    pub fn execute(&mut self) -> PluginResult<bool> {
        self.executions += 1;
        let result = self.plugin.execute();
        self.state = ActionState::Executed;

        match &result {
            Ok(true) => tracing::debug!(plugin_id = self.plugin.identifier(), "action succeeded"),
            Ok(false) => tracing::info!(plugin_id = self.plugin.identifier(), "action reported failure"),
            Err(e) => tracing::warn!(plugin_id = self.plugin.identifier(), error = %e, "action raised a fault"),
        }
        result
    }
}

/// Apply `parameters` to an action and execute it once.
pub fn run_action<I, K>(plugin: &mut dyn ActionPlugin, parameters: I) -> PluginResult<bool>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut run = ActionRun::new(plugin);
    for (name, value) in parameters {
        run.set_parameter(name.as_ref(), value);
    }
    run.execute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Properties;
    use crate::plugin::interface::{Plugin, PluginDescriptor, PluginError};

    /// Records every lifecycle call.
    struct Recorder {
        descriptor: PluginDescriptor,
        calls: Vec<String>,
        fail_init: bool,
        fail_on: Option<i64>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                descriptor: PluginDescriptor::new("Recorder", ""),
                calls: Vec::new(),
                fail_init: false,
                fail_on: None,
            }
        }

        fn count(&self, call: &str) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl Plugin for Recorder {
        fn identifier(&self) -> &str {
            "test.transform.recorder"
        }

        fn descriptor(&self) -> &PluginDescriptor {
            &self.descriptor
        }

        fn descriptor_mut(&mut self) -> &mut PluginDescriptor {
            &mut self.descriptor
        }
    }

    impl TransformPlugin for Recorder {
        fn init(&mut self) -> PluginResult<()> {
            self.calls.push("init".to_string());
            if self.fail_init {
                return Err(PluginError::new("init failed"));
            }
            Ok(())
        }

        fn process_row(&mut self, row: Row) -> PluginResult<Option<Row>> {
            self.calls.push("process_row".to_string());
            let n = row.get("n").and_then(Value::as_i64).unwrap_or_default();
            if self.fail_on == Some(n) {
                return Err(PluginError::new(format!("bad row {}", n)));
            }
            // keep even rows only
            Ok((n % 2 == 0).then_some(row))
        }

        fn dispose(&mut self) -> PluginResult<()> {
            self.calls.push("dispose".to_string());
            Ok(())
        }
    }

    fn rows(n: i64) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("n".to_string(), Value::Int(i));
                row
            })
            .collect()
    }

    #[test]
    fn test_lifecycle_ordering() {
        for n in [0, 1, 5] {
            let mut plugin = Recorder::new();
            let out = run_transform(&mut plugin, rows(n)).unwrap();

            assert_eq!(plugin.count("init"), 1);
            assert_eq!(plugin.count("dispose"), 1);
            assert_eq!(plugin.count("process_row"), n as usize);
            assert_eq!(plugin.calls.first().map(String::as_str), Some("init"));
            assert_eq!(plugin.calls.last().map(String::as_str), Some("dispose"));
            assert_eq!(out.len(), ((n + 1) / 2) as usize);
        }
    }

    #[test]
    fn test_dispose_after_row_fault() {
        let mut plugin = Recorder::new();
        plugin.fail_on = Some(2);

        let err = run_transform(&mut plugin, rows(5)).unwrap_err();
        assert_eq!(err.to_string(), "bad row 2");
        assert_eq!(plugin.count("process_row"), 3);
        assert_eq!(plugin.count("dispose"), 1);
    }

    #[test]
    fn test_dispose_after_init_fault() {
        let mut plugin = Recorder::new();
        plugin.fail_init = true;

        assert!(run_transform(&mut plugin, rows(3)).is_err());
        assert_eq!(plugin.count("process_row"), 0);
        assert_eq!(plugin.count("dispose"), 1);
    }

    #[test]
    fn test_dropped_run_disposes() {
        let mut plugin = Recorder::new();
        {
            let mut run = TransformRun::new(&mut plugin);
            run.start().unwrap();
            assert_eq!(run.state(), TransformState::Initialized);
            run.process(rows(1).remove(0)).unwrap();
            assert_eq!(run.state(), TransformState::Processing);
        }
        assert_eq!(plugin.count("dispose"), 1);
    }

    #[test]
    fn test_process_requires_start() {
        let mut plugin = Recorder::new();
        {
            let mut run = TransformRun::new(&mut plugin);
            assert!(run.process(Row::new()).is_err());
            assert_eq!(run.state(), TransformState::Constructed);
        }
        assert_eq!(plugin.calls, vec!["dispose"]);

        let mut plugin = Recorder::new();
        plugin.fail_init = true;
        {
            let mut run = TransformRun::new(&mut plugin);
            assert!(run.start().is_err());
            assert!(run.process(Row::new()).is_err());
        }
        assert_eq!(plugin.calls, vec!["init", "dispose"]);
    }

    #[test]
    fn test_run_stats() {
        let mut plugin = Recorder::new();
        let mut run = TransformRun::new(&mut plugin);
        run.start().unwrap();
        for row in rows(4) {
            run.process(row).unwrap();
        }
        let stats = run.finish().unwrap();

        assert_eq!(stats.rows_in, 4);
        assert_eq!(stats.rows_out, 2);
        assert_eq!(stats.rows_dropped, 2);
        assert!(stats.finished_at >= stats.started_at);
        assert_eq!(plugin.count("dispose"), 1);
    }

    struct Counter {
        descriptor: PluginDescriptor,
        parameters: Properties,
        runs: usize,
    }

    impl Plugin for Counter {
        fn identifier(&self) -> &str {
            "test.action.counter"
        }

        fn descriptor(&self) -> &PluginDescriptor {
            &self.descriptor
        }

        fn descriptor_mut(&mut self) -> &mut PluginDescriptor {
            &mut self.descriptor
        }
    }

    impl ActionPlugin for Counter {
        fn parameters(&self) -> &Properties {
            &self.parameters
        }

        fn parameters_mut(&mut self) -> &mut Properties {
            &mut self.parameters
        }

        fn execute(&mut self) -> PluginResult<bool> {
            self.runs += 1;
            match self.get_parameter("limit").as_i64() {
                Some(limit) => Ok((self.runs as i64) <= limit),
                None => Err(PluginError::invalid_parameter("limit", "missing")),
            }
        }
    }

    fn counter() -> Counter {
        Counter {
            descriptor: PluginDescriptor::new("Counter", ""),
            parameters: Properties::new(),
            runs: 0,
        }
    }

    #[test]
    fn test_action_run_states() {
        let mut plugin = counter();
        let mut run = ActionRun::new(&mut plugin);
        assert_eq!(run.state(), ActionState::Constructed);

        run.set_parameter("limit", 1);
        assert_eq!(run.state(), ActionState::Configured);

        assert!(run.execute().unwrap());
        assert_eq!(run.state(), ActionState::Executed);
        assert!(!run.execute().unwrap());
        assert_eq!(run.executions(), 2);

        run.set_parameter("limit", 5);
        assert_eq!(run.state(), ActionState::Configured);
        assert!(run.execute().unwrap());
    }

    #[test]
    fn test_action_fault_propagates() {
        let mut plugin = counter();
        let err = run_action(&mut plugin, Vec::<(String, Value)>::new()).unwrap_err();
        assert!(matches!(err, PluginError::InvalidParameter { .. }));
    }

    #[test]
    fn test_run_action_applies_parameters() {
        let mut plugin = counter();
        assert!(run_action(&mut plugin, [("limit", Value::Int(3))]).unwrap());
        assert_eq!(plugin.get_parameter("limit"), Value::Int(3));
    }
}
