pub mod booking;
pub mod chat;
pub mod event;
pub mod gallery;
pub mod media;
pub mod menu;
pub mod resource;
pub mod section;
pub mod showcase;
pub mod testimonial;
pub mod theme;

pub use booking::{Booking, BookingAction, BookingRequest, BookingStatus};
pub use chat::{ChatMessage, ChatRole};
pub use event::EventHighlight;
pub use gallery::GalleryItem;
pub use media::MediaAsset;
pub use menu::MenuItem;
pub use resource::{Creatable, DocMeta, Resource};
pub use section::ContentSection;
pub use showcase::FoodShowcaseItem;
pub use testimonial::Testimonial;
pub use theme::ThemeSettings;
