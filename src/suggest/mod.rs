pub(crate) mod collaborator;
