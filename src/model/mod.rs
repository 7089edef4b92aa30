/// 集合与工作流文件模型
pub mod collection;
pub mod request;
pub mod workflow;

pub use collection::{Collection, CollectionRequest, CollectionSettings};
pub use request::RequestTemplate;
pub use workflow::{Workflow, WorkflowStep};
