pub(crate) mod csv_xml;
pub(crate) mod json;
pub(crate) mod numbered_prose;
pub(crate) mod status_tagged;
pub(crate) mod template;
