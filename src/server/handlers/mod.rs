pub mod catalog;
pub mod drawing_types;
pub mod health;
pub mod inference_servers;
pub mod line_type_components;
pub mod line_types;
pub mod tree;
