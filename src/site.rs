use crate::format;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Thumbnail path stored for files that have no real thumbnail and get a
/// generic icon chosen by extension instead.
pub const GENERIC_THUMB: &str = "file";

/// Thumbnail marker for files posted with a spoiler image.
pub const SPOILER_THUMB: &str = "spoiler";

/// The state of one named attribute on a source record.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Absent,
    Empty,
    Value(Value),
}

impl Attr {
    pub fn from_value(value: Value) -> Attr {
        match value {
            Value::Null => Attr::Empty,
            Value::String(ref s) if s.is_empty() => Attr::Empty,
            v => Attr::Value(v),
        }
    }
}

pub trait ToAttr {
    fn to_attr(&self) -> Attr;
}

impl ToAttr for String {
    fn to_attr(&self) -> Attr {
        Attr::from_value(Value::String(self.clone()))
    }
}

macro_rules! impl_to_attr {
    ($($scalar_t:ty),+) => {
        $(impl ToAttr for $scalar_t {
            fn to_attr(&self) -> Attr {
                Attr::Value(Value::from(*self))
            }
        })+
    }
}

impl_to_attr!(u32, u64, i64, bool);

impl ToAttr for Value {
    fn to_attr(&self) -> Attr {
        Attr::from_value(self.clone())
    }
}

impl<T: ToAttr> ToAttr for Option<T> {
    fn to_attr(&self) -> Attr {
        match self {
            Some(v) => v.to_attr(),
            None => Attr::Absent,
        }
    }
}

// Storage hands numbers over as strings and flags as 0/1, so numeric and
// flag columns accept any scalar. Null and "" read as missing.

fn loose_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Attr::from_value(Value::deserialize(deserializer)?) {
        Attr::Value(v) => Ok(serde_json::from_value(format::coerce_int(&v)).ok()),
        Attr::Absent | Attr::Empty => Ok(None),
    }
}

fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(loose_int(deserializer)?.unwrap_or_default())
}

fn loose_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Attr::from_value(Value::deserialize(deserializer)?) {
        Attr::Value(Value::Bool(b)) => Ok(Some(b)),
        Attr::Value(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Attr::Value(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Attr::Value(v) => Ok(Some(format::coerce_int(&v) != Value::from(0))),
        Attr::Absent | Attr::Empty => Ok(None),
    }
}

/// Lookup of attributes by their internal name, used by the field tables.
pub trait Record {
    fn attr(&self, name: &str) -> Attr;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct File {
    pub file_id    : Option<Value>,
    pub file_path  : Option<String>,
    #[serde(rename = "type")]
    pub mime       : Option<String>,
    pub extension  : Option<String>,
    #[serde(deserialize_with = "loose_int")]
    pub height     : Option<u32>,
    #[serde(deserialize_with = "loose_int")]
    pub width      : Option<u32>,
    #[serde(deserialize_with = "loose_int")]
    pub size       : Option<u64>,
    pub name       : Option<String>,
    pub thumb_path : Option<String>,
    pub thumb      : Option<String>,
    pub hash       : Option<String>,
    #[serde(flatten)]
    pub extra      : Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "loose_id")]
    pub id             : u64,
    #[serde(deserialize_with = "loose_int")]
    pub thread         : Option<u64>,
    pub board          : String,
    pub ip             : String,
    pub subject        : Option<String>,
    pub body           : String,
    pub body_nomarkup  : Option<String>,
    pub email          : Option<String>,
    pub name           : Option<String>,
    pub trip           : Option<String>,
    pub capcode        : Option<String>,
    #[serde(deserialize_with = "loose_int")]
    pub time           : Option<i64>,
    #[serde(deserialize_with = "loose_int")]
    pub omitted        : Option<u64>,
    #[serde(deserialize_with = "loose_int")]
    pub omitted_images : Option<u64>,
    #[serde(deserialize_with = "loose_int")]
    pub replies        : Option<u64>,
    #[serde(deserialize_with = "loose_int")]
    pub images         : Option<u64>,
    #[serde(deserialize_with = "loose_bool")]
    pub sticky         : Option<bool>,
    #[serde(deserialize_with = "loose_bool")]
    pub locked         : Option<bool>,
    #[serde(deserialize_with = "loose_bool")]
    pub cycle          : Option<bool>,
    #[serde(deserialize_with = "loose_int")]
    pub bump           : Option<i64>,
    pub embed          : Option<String>,
    pub slug           : Option<String>,
    pub filehash       : Option<String>,
    pub files          : Vec<File>,
    #[serde(flatten)]
    pub extra          : Map<String, Value>,
}

impl Post {
    /// Roots have no parent thread; storage may record that as 0.
    pub fn is_root(&self) -> bool {
        self.thread.map_or(true, |t| t == 0)
    }

    /// The thread this post belongs to; a thread root is its own thread.
    pub fn thread_id(&self) -> u64 {
        self.thread.filter(|t| *t != 0).unwrap_or(self.id)
    }
}

macro_rules! impl_record {
    ($($rec_t:ident { $($name:literal => $field:ident),+ $(,)? })+) => {
        $(impl Record for $rec_t {
            fn attr(&self, name: &str) -> Attr {
                match name {
                    $($name => self.$field.to_attr(),)+
                    _ => match self.extra.get(name) {
                        Some(v) => Attr::from_value(v.clone()),
                        None => Attr::Absent,
                    },
                }
            }
        })+
    }
}

impl_record!(
    Post {
        "id" => id,
        "thread" => thread,
        "board" => board,
        "ip" => ip,
        "subject" => subject,
        "body" => body,
        "body_nomarkup" => body_nomarkup,
        "email" => email,
        "name" => name,
        "trip" => trip,
        "capcode" => capcode,
        "time" => time,
        "omitted" => omitted,
        "omitted_images" => omitted_images,
        "replies" => replies,
        "images" => images,
        "sticky" => sticky,
        "locked" => locked,
        "cycle" => cycle,
        "bump" => bump,
        "embed" => embed,
        "slug" => slug,
        "filehash" => filehash,
    }
    File {
        "file_id" => file_id,
        "file_path" => file_path,
        "type" => mime,
        "extension" => extension,
        "height" => height,
        "width" => width,
        "size" => size,
        "name" => name,
        "thumb_path" => thumb_path,
        "thumb" => thumb,
        "hash" => hash,
    }
);

/// A thread root together with its replies in posting order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thread {
    pub op    : Post,
    #[serde(default)]
    pub posts : Vec<Post>,
}

impl Thread {
    pub fn all_posts(&self) -> impl Iterator<Item = &Post> {
        std::iter::once(&self.op).chain(self.posts.iter())
    }
}

/// One page of a board catalog as handed over by the storage layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    pub page    : u32,
    #[serde(default)]
    pub threads : Vec<Thread>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attr_tri_state() {
        let post = Post {
            id: 7,
            subject: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(post.attr("id"), Attr::Value(json!(7)));
        assert_eq!(post.attr("subject"), Attr::Empty);
        assert_eq!(post.attr("trip"), Attr::Absent);
        assert_eq!(post.attr("no_such_attr"), Attr::Absent);
    }

    #[test]
    fn test_extra_attrs_from_json() {
        let post: Post = serde_json::from_value(json!({
            "id": 12,
            "board": "b",
            "views": "40",
            "flair": null,
        }))
        .unwrap();

        assert_eq!(post.attr("views"), Attr::Value(json!("40")));
        assert_eq!(post.attr("flair"), Attr::Empty);
        assert_eq!(post.attr("board"), Attr::Value(json!("b")));
    }

    #[test]
    fn test_file_type_attr() {
        let file: File = serde_json::from_value(json!({
            "type": "image/png",
            "width": 640,
        }))
        .unwrap();

        assert_eq!(file.mime.as_deref(), Some("image/png"));
        assert_eq!(file.attr("type"), Attr::Value(json!("image/png")));
        assert_eq!(file.attr("width"), Attr::Value(json!(640)));
        assert_eq!(file.attr("height"), Attr::Absent);
    }

    #[test]
    fn test_numeric_columns_accept_strings() {
        let post: Post = serde_json::from_value(json!({
            "id": "5",
            "thread": "1",
            "time": "1700000000",
            "bump": 1700000100,
            "replies": "",
            "omitted": null,
            "images": "2 images",
        }))
        .unwrap();

        assert_eq!(post.id, 5);
        assert_eq!(post.thread, Some(1));
        assert_eq!(post.time, Some(1_700_000_000));
        assert_eq!(post.bump, Some(1_700_000_100));
        assert_eq!(post.replies, None);
        assert_eq!(post.omitted, None);
        assert_eq!(post.images, Some(2));
    }

    #[test]
    fn test_flag_columns_accept_ints() {
        let post: Post = serde_json::from_value(json!({
            "sticky": 1,
            "locked": "0",
            "cycle": "true",
        }))
        .unwrap();

        assert_eq!(post.sticky, Some(true));
        assert_eq!(post.locked, Some(false));
        assert_eq!(post.cycle, Some(true));
        assert_eq!(post.attr("sticky"), Attr::Value(json!(true)));
    }

    #[test]
    fn test_file_columns_accept_any_scalar() {
        let file: File = serde_json::from_value(json!({
            "file_id": 123,
            "size": "2048",
            "height": 480.0,
            "width": "",
        }))
        .unwrap();

        assert_eq!(file.attr("file_id"), Attr::Value(json!(123)));
        assert_eq!(file.size, Some(2048));
        assert_eq!(file.height, Some(480));
        assert_eq!(file.width, None);
    }

    #[test]
    fn test_zero_thread_is_root() {
        let post: Post = serde_json::from_value(json!({"id": 9, "thread": 0})).unwrap();

        assert!(post.is_root());
        assert_eq!(post.thread_id(), 9);
    }

    #[test]
    fn test_thread_ids() {
        let thread = Thread {
            op: Post { id: 100, ..Default::default() },
            posts: vec![Post { id: 101, thread: Some(100), ..Default::default() }],
        };

        assert!(thread.op.is_root());
        assert_eq!(thread.op.thread_id(), 100);
        assert_eq!(thread.posts[0].thread_id(), 100);
        assert_eq!(thread.all_posts().count(), 2);
    }
}
