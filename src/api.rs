use crate::config::Config;
use crate::format;
use crate::modifiers::{self, ModifierExtractor, TagModifiers};
use crate::posterid::{PosterId, SaltedPosterId};
use crate::site::{self, Attr, Record};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use std::collections::HashSet;

/// One post in the public API schema, keys in table order.
pub type ApiPost = Map<String, Value>;

/// Internal attribute name → API field name.
pub type FieldTable = IndexMap<String, String>;

const POST_FIELDS: &[(&str, &str)] = &[
    ("id", "no"),
    ("thread", "resto"),
    ("subject", "sub"),
    ("body", "com"),
    ("email", "email"),
    ("name", "name"),
    ("trip", "trip"),
    ("capcode", "capcode"),
    ("time", "time"),
    ("omitted", "omitted_posts"),
    ("omitted_images", "omitted_images"),
    ("replies", "replies"),
    ("images", "images"),
    ("sticky", "sticky"),
    ("locked", "locked"),
    ("cycle", "cyclical"),
    ("bump", "last_modified"),
    ("embed", "embed"),
    ("board", "board"),
];

const THREADS_PAGE_FIELDS: &[(&str, &str)] = &[
    ("id", "no"),
    ("bump", "last_modified"),
    ("board", "board"),
];

const FILE_FIELDS: &[(&str, &str)] = &[
    ("file_id", "id"),
    ("file_path", "file_path"),
    ("type", "mime"),
    ("extension", "ext"),
    ("height", "h"),
    ("width", "w"),
    ("size", "fsize"),
];

/// API fields that clients expect as integers whatever the source type.
pub const INT_FIELDS: &[&str] = &[
    "no",
    "resto",
    "time",
    "tn_w",
    "tn_h",
    "w",
    "h",
    "fsize",
    "omitted_posts",
    "omitted_images",
    "replies",
    "images",
    "sticky",
    "locked",
    "last_modified",
];

lazy_static! {
    static ref FLAG_CODE: Regex = Regex::new(r"^[0-9a-z_-]{2,}$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    /// Identifier, last-modified time and board only, for index listings.
    ThreadsPageOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiThread {
    pub posts: Vec<ApiPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiPage {
    pub threads: Vec<ApiThread>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiCatalogPage {
    pub threads: Vec<ApiPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page:    Option<u32>,
}

fn table(pairs: &[(&str, &str)]) -> FieldTable {
    pairs.iter()
         .map(|(local, api)| (local.to_string(), api.to_string()))
         .collect()
}

/// Copies every attribute named in `fields` that is present and non-empty
/// on `record` into `api_post` under its API name.
fn fill_fields<R: Record + ?Sized>(fields: &FieldTable, record: &R, api_post: &mut ApiPost) {
    for (local, translated) in fields {
        let val = match record.attr(local) {
            Attr::Value(val) => val,
            Attr::Absent | Attr::Empty => continue,
        };

        let val = match INT_FIELDS.contains(&translated.as_str()) {
            true => format::coerce_int(&val),
            false => val,
        };
        api_post.insert(translated.clone(), val);
    }
}

pub fn translate_fields<R: Record + ?Sized>(fields: &FieldTable, record: &R) -> ApiPost {
    let mut api_post = ApiPost::new();
    fill_fields(fields, record, &mut api_post);
    api_post
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Translates posts, threads and catalogs into the public JSON API.
///
/// The field tables are fixed when the translator is built; every call
/// builds its output from scratch, so one `Api` can be shared between
/// request handlers.
pub struct Api<P: PosterId = SaltedPosterId, M: ModifierExtractor = TagModifiers> {
    config:              Config,
    post_fields:         FieldTable,
    threads_page_fields: FieldTable,
    file_fields:         FieldTable,
    poster_ids:          P,
    modifiers:           M,
}

impl Api {
    pub fn new(config: Config) -> Api {
        let poster_ids = SaltedPosterId::new(&config.secure_trip_salt);
        Api::with_hooks(config, poster_ids, TagModifiers)
    }
}

impl<P: PosterId, M: ModifierExtractor> Api<P, M> {
    pub fn with_hooks(config: Config, poster_ids: P, modifiers: M) -> Self {
        let mut post_fields = table(POST_FIELDS);
        for (local, translated) in &config.api.extra_fields {
            post_fields.insert(local.clone(), translated.clone());
        }

        Api {
            post_fields,
            threads_page_fields: table(THREADS_PAGE_FIELDS),
            file_fields: table(FILE_FIELDS),
            config,
            poster_ids,
            modifiers,
        }
    }

    pub fn post_fields(&self) -> &FieldTable {
        &self.post_fields
    }

    pub fn threads_page_fields(&self) -> &FieldTable {
        &self.threads_page_fields
    }

    pub fn file_fields(&self) -> &FieldTable {
        &self.file_fields
    }

    pub fn translate_file(&self, file: &site::File, post: &site::Post) -> ApiPost {
        let mut api_file = translate_fields(&self.file_fields, file);

        if let Some(name) = file.name.as_deref() {
            match format::filename_stem(name) {
                Some(stem) => {
                    api_file.insert("filename".to_string(), Value::from(stem));
                },
                None => debug!(file = %name, "file name has no extension, omitting filename"),
            }
        }

        if let Some(thumb) = non_empty(&file.thumb) {
            api_file.insert("spoiler".to_string(), Value::Bool(thumb == site::SPOILER_THUMB));
        }

        if let Some(hash) = non_empty(&file.hash).or_else(|| non_empty(&post.filehash)) {
            match format::hex_to_base64(hash) {
                Some(md5) => {
                    api_file.insert("md5".to_string(), Value::String(md5));
                },
                None => debug!(hash = %hash, post = post.id, "file hash is not hex, omitting md5"),
            }
        }

        match file.thumb_path.as_deref() {
            Some(site::GENERIC_THUMB) => {
                let icon = self.config.file_icon(file.extension.as_deref());
                api_file.insert("thumb_path".to_string(),
                                Value::String(format::format_thumb(&self.config.file_thumb, icon)));
            },
            Some(path) if !path.is_empty() => {
                api_file.insert("thumb_path".to_string(), Value::from(path));
            },
            _ => {},
        }

        api_file
    }

    pub fn translate_post(&self, post: &site::Post, mode: Mode) -> ApiPost {
        let fields = match mode {
            Mode::Full => &self.post_fields,
            Mode::ThreadsPageOnly => &self.threads_page_fields,
        };
        let mut api_post = translate_fields(fields, post);

        if self.config.poster_ids {
            let id = self.poster_ids.poster_id(&post.ip, post.thread_id(), &post.board);
            api_post.insert("id".to_string(), Value::String(id));
        }

        if mode == Mode::ThreadsPageOnly {
            return api_post;
        }

        if let Some(body) = post.body_nomarkup.as_deref() {
            if self.config.show_flags() {
                self.apply_modifiers(body, &mut api_post);
            }
        }

        if self.config.slugify && post.is_root() {
            if let Some(slug) = non_empty(&post.slug) {
                api_post.insert("semantic_url".to_string(), Value::from(slug));
            }
        }

        if !post.files.is_empty() {
            let files = post.files
                            .iter()
                            .map(|f| Value::Object(self.translate_file(f, post)))
                            .collect();
            api_post.insert("files".to_string(), Value::Array(files));
        }

        api_post
    }

    fn apply_modifiers(&self, body_nomarkup: &str, api_post: &mut ApiPost) {
        let mods = self.modifiers.extract_modifiers(body_nomarkup);

        if let (Some(flag), Some(alt)) = (mods.get(modifiers::FLAG), mods.get(modifiers::FLAG_ALT)) {
            if FLAG_CODE.is_match(flag) {
                api_post.insert("country".to_string(), Value::String(flag.to_lowercase()));
                api_post.insert("country_name".to_string(), Value::String(alt.clone()));
            }
        }

        if let Some(warning) = mods.get(modifiers::WARNING_MESSAGE) {
            api_post.insert("warning_msg".to_string(), Value::String(warning.clone()));
        }

        if let Some(ban) = mods.get(modifiers::BAN_MESSAGE) {
            api_post.insert("ban_msg".to_string(), Value::String(ban.clone()));
        }
    }

    pub fn translate_thread(&self, thread: &site::Thread, mode: Mode) -> ApiThread {
        let mut op = self.translate_post(&thread.op, mode);
        if mode == Mode::Full {
            op.insert("resto".to_string(), Value::from(0));
        }

        let mut posts = Vec::with_capacity(thread.posts.len() + 1);
        posts.push(op);
        posts.extend(thread.posts.iter().map(|p| self.translate_post(p, mode)));

        let unique_ips = thread.all_posts()
                               .map(|p| p.ip.as_str())
                               .collect::<HashSet<&str>>()
                               .len();
        posts[0].insert("unique_ips".to_string(), Value::from(unique_ips as u64));

        ApiThread { posts }
    }

    pub fn translate_page(&self, threads: &[site::Thread]) -> ApiPage {
        ApiPage {
            threads: threads.iter()
                            .map(|t| self.translate_thread(t, Mode::Full))
                            .collect(),
        }
    }

    /// Thread roots only; each entry carries the root's `unique_ips`.
    pub fn translate_catalog_page(&self, threads: &[site::Thread], mode: Mode) -> ApiCatalogPage {
        let threads = threads.iter()
                             .filter_map(|t| self.translate_thread(t, mode).posts.into_iter().next())
                             .collect();
        ApiCatalogPage { threads, page: None }
    }

    pub fn translate_catalog<'a, I>(&self, catalog: I, mode: Mode) -> Vec<ApiCatalogPage>
    where
        I: IntoIterator<Item = &'a site::Page>,
    {
        catalog.into_iter()
               .map(|page| {
                   let mut api_page = self.translate_catalog_page(&page.threads, mode);
                   api_page.page = Some(page.page);
                   api_page
               })
               .collect()
    }
}
