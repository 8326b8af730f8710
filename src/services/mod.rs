pub mod component_service;
pub mod component_version_service;
pub mod drawing_type_service;
pub mod inference_server_service;
pub mod line_type_component_service;
pub mod line_type_service;
pub mod reorder_service;
pub mod siblings;
pub mod validation;

pub use component_service::{ComponentService, PartService};
pub use component_version_service::ComponentVersionService;
pub use drawing_type_service::DrawingTypeService;
pub use inference_server_service::InferenceServerService;
pub use line_type_component_service::LineTypeComponentService;
pub use line_type_service::LineTypeService;
pub use reorder_service::{ReorderService, TreeLocks};
