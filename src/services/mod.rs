pub mod hosting;
pub mod transform;

// Re-export commonly used services
pub use hosting::HostingClient;
pub use transform::TransformClient;
