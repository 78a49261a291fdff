use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Id = i64;

/// Records that may carry a server-assigned identity.
pub trait Identified {
    fn id(&self) -> Option<Id>;
    fn set_id(&mut self, id: Id);

    /// Same entity only when both sides are persisted with equal ids.
    fn same_entity(&self, other: &Self) -> bool {
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> Option<Id> { self.id }
            fn set_id(&mut self, id: Id) { self.id = Some(id); }
        })*
    };
}

/// Kind of entity a `Like` or `Participation` is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParentType {
    AccountDeletion,
    Comment,
    Contact,
    Conversation,
    Event,
    EventParticipation,
    Like,
    Location,
    Message,
    Participation,
    Photo,
    Poll,
    PollAnswer,
    PollParticipation,
    Post,
    Profile,
    Reshare,
    Retraction,
    StatusMessage,
}

impl ParentType {
    pub const ALL: [ParentType; 19] = [
        ParentType::AccountDeletion,
        ParentType::Comment,
        ParentType::Contact,
        ParentType::Conversation,
        ParentType::Event,
        ParentType::EventParticipation,
        ParentType::Like,
        ParentType::Location,
        ParentType::Message,
        ParentType::Participation,
        ParentType::Photo,
        ParentType::Poll,
        ParentType::PollAnswer,
        ParentType::PollParticipation,
        ParentType::Post,
        ParentType::Profile,
        ParentType::Reshare,
        ParentType::Retraction,
        ParentType::StatusMessage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParentType::AccountDeletion => "ACCOUNTDELETION",
            ParentType::Comment => "COMMENT",
            ParentType::Contact => "CONTACT",
            ParentType::Conversation => "CONVERSATION",
            ParentType::Event => "EVENT",
            ParentType::EventParticipation => "EVENTPARTICIPATION",
            ParentType::Like => "LIKE",
            ParentType::Location => "LOCATION",
            ParentType::Message => "MESSAGE",
            ParentType::Participation => "PARTICIPATION",
            ParentType::Photo => "PHOTO",
            ParentType::Poll => "POLL",
            ParentType::PollAnswer => "POLLANSWER",
            ParentType::PollParticipation => "POLLPARTICIPATION",
            ParentType::Post => "POST",
            ParentType::Profile => "PROFILE",
            ParentType::Reshare => "RESHARE",
            ParentType::Retraction => "RETRACTION",
            ParentType::StatusMessage => "STATUSMESSAGE",
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown parent type `{0}`")]
pub struct UnknownParentType(pub String);

impl FromStr for ParentType {
    type Err = UnknownParentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownParentType(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub searchable: bool,
    pub public_details: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountDeletion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub guid: Option<String>,
    pub diaspora_id: Option<String>,
    pub serialized_public_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_account: bool,
    pub profile: Option<Profile>,
    #[serde(rename = "accountdeletion")]
    pub account_deletion: Option<AccountDeletion>,
}

impl Person {
    /// Id of the owned profile, if one is attached and persisted.
    pub fn profile_id(&self) -> Option<Id> {
        self.profile.as_ref().and_then(|p| p.id)
    }

    pub fn account_deletion_id(&self) -> Option<Id> {
        self.account_deletion.as_ref().and_then(|a| a.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub guid: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub public: bool,
    pub text: Option<String>,
}

/// Author/recipient relationship to a Person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub recipient: Option<String>,
    pub following: bool,
    pub sharing: bool,
    pub person: Option<Person>,
}

impl Contact {
    pub fn new(author: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            recipient: Some(recipient.into()),
            ..Self::default()
        }
    }

    pub fn with_following(mut self, following: bool) -> Self {
        self.following = following;
        self
    }

    pub fn with_sharing(mut self, sharing: bool) -> Self {
        self.sharing = sharing;
        self
    }

    pub fn with_person(mut self, person: Person) -> Self {
        self.person = Some(person);
        self
    }
}

/// A reaction to a parent entity. `positive == false` is a dislike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Like {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub guid: Option<String>,
    pub parent_guid: Option<String>,
    pub parent_type: Option<ParentType>,
    pub positive: bool,
    pub author_signature: Option<String>,
    pub parent_author_signature: Option<String>,
    pub post: Option<Post>,
}

impl Like {
    /// New unsigned reaction with a fresh guid.
    pub fn new(author: impl Into<String>, parent_guid: impl Into<String>, parent_type: ParentType) -> Self {
        Self {
            author: Some(author.into()),
            guid: Some(uuid::Uuid::new_v4().to_string()),
            parent_guid: Some(parent_guid.into()),
            parent_type: Some(parent_type),
            ..Self::default()
        }
    }

    pub fn with_positive(mut self, positive: bool) -> Self {
        self.positive = positive;
        self
    }

    pub fn with_signatures(mut self, author: impl Into<String>, parent_author: impl Into<String>) -> Self {
        self.author_signature = Some(author.into());
        self.parent_author_signature = Some(parent_author.into());
        self
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.post = Some(post);
        self
    }

    /// The liked post, only when the parent actually is a post.
    pub fn attached_post(&self) -> Option<&Post> {
        match self.parent_type? {
            ParentType::Post => self.post.as_ref(),
            ParentType::AccountDeletion
            | ParentType::Comment
            | ParentType::Contact
            | ParentType::Conversation
            | ParentType::Event
            | ParentType::EventParticipation
            | ParentType::Like
            | ParentType::Location
            | ParentType::Message
            | ParentType::Participation
            | ParentType::Photo
            | ParentType::Poll
            | ParentType::PollAnswer
            | ParentType::PollParticipation
            | ParentType::Profile
            | ParentType::Reshare
            | ParentType::Retraction
            | ParentType::StatusMessage => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub guid: Option<String>,
    pub parent_guid: Option<String>,
    pub parent_type: Option<ParentType>,
    pub person: Option<Person>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub guid: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub conversation_id: Option<Id>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conversation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub author: Option<String>,
    pub guid: Option<String>,
    pub subject: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub participants: Vec<Person>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn is_participant(&self, person: &Person) -> bool {
        self.participants.iter().any(|p| p.same_entity(person))
    }

    /// Messages visible to `person`; empty for outsiders.
    pub fn messages_for(&self, person: &Person) -> &[Message] {
        if self.is_participant(person) { &self.messages } else { &[] }
    }
}

/// Every message `person` can see across `conversations`, newest first.
pub fn inbox(conversations: &[Conversation], person: &Person) -> Vec<Message> {
    let mut messages: Vec<Message> = conversations
        .iter()
        .flat_map(|c| c.messages_for(person).iter().cloned())
        .collect();
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    messages
}

identified!(Profile, AccountDeletion, Person, Post, Contact, Like, Participation, Message, Conversation);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_are_false() {
        let c = Contact::new("alice@pod", "bob@pod");
        assert!(!c.following && !c.sharing);
        let l = Like::new("alice@pod", "guid-1", ParentType::Comment);
        assert!(!l.positive);
        assert!(!Like::default().positive);
    }

    #[test]
    fn parent_type_wire_names() {
        for t in ParentType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<ParentType>().unwrap(), t);
        }
        assert!("Post".parse::<ParentType>().is_err());
    }

    #[test]
    fn attached_post_requires_post_parent() {
        let post = Post { id: Some(7), ..Post::default() };
        let on_post = Like::new("a", "g", ParentType::Post).with_post(post.clone());
        assert_eq!(on_post.attached_post(), Some(&post));
        let on_photo = Like::new("a", "g", ParentType::Photo).with_post(post);
        assert!(on_photo.attached_post().is_none());
    }

    #[test]
    fn unsaved_records_are_never_the_same_entity() {
        let a = Person::default();
        assert!(!a.same_entity(&a.clone()));
        let b = Person { id: Some(3), ..Person::default() };
        assert!(b.same_entity(&b.clone()));
    }

    #[test]
    fn inbox_sorts_newest_first_and_hides_foreign_conversations() {
        let me = Person { id: Some(1), ..Person::default() };
        let other = Person { id: Some(2), ..Person::default() };
        let at = |h| Some(Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap());
        let mine = Conversation {
            id: Some(10),
            participants: vec![me.clone(), other.clone()],
            messages: vec![
                Message { id: Some(1), created_at: at(1), ..Message::default() },
                Message { id: Some(2), created_at: at(3), ..Message::default() },
            ],
            ..Conversation::default()
        };
        let theirs = Conversation {
            id: Some(11),
            participants: vec![other],
            messages: vec![Message { id: Some(3), created_at: at(2), ..Message::default() }],
            ..Conversation::default()
        };
        let ids: Vec<_> = inbox(&[mine, theirs], &me).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![Some(2), Some(1)]);
    }

    #[test]
    fn person_uses_accountdeletion_key() {
        let p = Person {
            id: Some(1),
            account_deletion: Some(AccountDeletion { id: Some(4), author: None }),
            ..Person::default()
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["accountdeletion"]["id"], 4);
        assert!(v.get("accountDeletion").is_none());
    }
}
