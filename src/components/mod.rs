// Component-based architecture for the NeuroStream TUI

pub mod component;

pub mod content_page;
pub mod footer;
pub mod hub;
pub mod splash;

pub use component::{Component, ComponentAction, View};
pub use content_page::ContentPageComponent;
pub use footer::Footer;
pub use hub::HubComponent;
pub use splash::SplashComponent;
