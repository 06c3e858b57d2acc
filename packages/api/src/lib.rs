//! Wire types for the family of Fediverse server APIs.
//!
//! This crate holds the plain decodable value types that cross the wire:
//! the two discovery documents, the structured error body servers return on
//! failure, and the small set of entities the endpoint catalog in `fedicap`
//! decodes responses into. There is no logic here beyond serde attributes;
//! servers diverge in what they send, so almost every field tolerates being
//! absent.
//!
//! # Documents covered
//!
//! | Request | Type |
//! |--------|------|
//! | `GET /.well-known/nodeinfo` | [`Jrd`] |
//! | `GET <nodeinfo schema url>` | [`NodeInfo`] |
//! | any non-2xx with a JSON body | [`ApiErrorBody`] |
//! | `GET /api/v1/instance` | [`Instance`] |
//! | `GET /api/v1/timelines/*` | `Vec<`[`Status`]`>` |
//! | `GET /api/v1/accounts/*` | [`Account`], [`Relationship`] |
//! | `GET /api/v1/notifications` | `Vec<`[`Notification`]`>` |

pub mod account;
pub mod announcement;
pub mod error;
pub mod instance;
pub mod list;
pub mod nodeinfo;
pub mod notification;
pub mod status;
pub mod tag;

use serde::{Deserialize, Serialize};

pub use account::{Account, FamiliarFollowers, Field, Relationship};
pub use announcement::Announcement;
pub use error::ApiErrorBody;
pub use instance::{CustomEmoji, Instance, InstanceV2, Rule};
pub use list::List;
pub use nodeinfo::{Jrd, JrdLink, NodeInfo, Software, Usage, Users};
pub use notification::{Notification, NotificationType};
pub use status::{Attachment, AttachmentType, Report, Status, Translation, Visibility};
pub use tag::{Tag, TagHistory};

/// Response body for endpoints that return nothing useful (`{}`).
///
/// Unknown fields are ignored so a server that echoes an object back still
/// decodes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty {}
