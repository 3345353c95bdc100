pub mod github;

pub use github::{
    CommitAuthor, EventCommit, EventPayload, PublicEvent, SearchUser, SearchUsersResponse,
    SocialAccount, UserProfile,
};
