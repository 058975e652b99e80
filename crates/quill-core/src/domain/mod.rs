//! Domain entities - the core business objects.

mod post;
mod profile;
mod session;
mod user;

pub mod slug;

pub use post::{NewPost, Post, PostChanges, PostDraft, PostId, PostPatch};
pub use profile::{Profile, ProfileChanges};
pub use session::{AuthEvent, AuthUser, Session};
pub use slug::Slug;
pub use user::{User, email_local_part, is_plausible_email, mask_email, normalize_email};
