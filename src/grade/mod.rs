pub(crate) mod effects;
pub(crate) mod pipeline;
pub(crate) mod settings;
pub(crate) mod tone;
