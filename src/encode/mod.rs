pub(crate) mod pipeline;
pub(crate) mod png;
pub(crate) mod queue;
