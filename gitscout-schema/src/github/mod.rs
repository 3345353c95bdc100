mod events;
mod search;
mod social;
mod user;

pub use events::{CommitAuthor, EventCommit, EventPayload, PublicEvent};
pub use search::{SearchUser, SearchUsersResponse};
pub use social::SocialAccount;
pub use user::UserProfile;
