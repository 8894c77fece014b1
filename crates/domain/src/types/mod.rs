//! Domain types and models

pub mod basic_user;
pub mod client;
pub mod group;
pub mod query;
pub mod resource;
pub mod search;
pub mod time;
pub mod token;
pub mod user;

pub use basic_user::BasicUser;
pub use client::{OauthClient, OauthClientBuilder};
pub use group::Group;
pub use query::{Query, QueryBuilder, SortOrder};
pub use resource::{Meta, Resource, ResourceType};
pub use search::SearchResult;
pub use token::{AccessToken, AccessTokenBuilder, Scope};
pub use user::{MemberRef, MultiValued, Name, User};
