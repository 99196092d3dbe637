mod bootstrap;
mod habitat;
mod loop_runner;
mod scene;
mod tuning;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
