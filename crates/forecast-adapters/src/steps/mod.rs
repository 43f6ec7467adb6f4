//! Steps concretos del pipeline.

mod notify;
mod remote;

pub use notify::{LogPublisher, Notification, NotifyStep, Publisher, QueuePublisher};
pub use remote::RemoteStep;
