pub mod component_versions;
pub mod components;
pub mod drawing_types;
pub mod inference_servers;
pub mod line_type_components;
pub mod line_types;
pub mod parts;
