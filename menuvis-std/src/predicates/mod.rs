//! Standard conditional predicates

mod query;
mod taxonomy;
mod user;
mod utility;

pub use query::{
    IsPage, IsSingle, IsSingular, IsFrontPage, IsHome, IsArchive, IsSearch, Is404,
    IsPostTypeArchive, IsPageTemplate, GetPostType, GetTheId,
};
pub use taxonomy::{IsCategory, IsTag, InCategory, HasTag};
pub use user::{IsUserLoggedIn, CurrentUserCan, UserHasRole};
pub use utility::{Count, InArray};
