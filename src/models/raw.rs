use super::de;
use serde::Deserialize;
use std::collections::HashMap;

/// `__UNIVERSAL_DATA_FOR_REHYDRATION__` script payload.
#[derive(Debug, Deserialize, Default)]
pub struct UniversalData {
    #[serde(rename = "__DEFAULT_SCOPE__", default)]
    pub default_scope: DefaultScope,
}

#[derive(Debug, Deserialize, Default)]
pub struct DefaultScope {
    #[serde(rename = "webapp.video-detail")]
    pub video_detail: Option<VideoDetail>,
    #[serde(rename = "webapp.user-detail")]
    pub user_detail: Option<UserDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub item_info: Option<ItemInfo>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub status_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    pub item_struct: Option<RawItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub user_info: Option<UserInfo>,
}

#[derive(Debug, Deserialize)]
pub struct UserInfo {
    pub user: Option<RawAuthor>,
    pub stats: Option<RawUserStats>,
}

/// `SIGI_STATE` payload of the legacy hashtag page layout.
#[derive(Debug, Deserialize, Default)]
pub struct SigiState {
    #[serde(rename = "ItemModule", default)]
    pub item_module: HashMap<String, RawItem>,
    #[serde(rename = "ItemList", default)]
    pub item_list: HashMap<String, RawItemList>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawItemList {
    #[serde(default)]
    pub list: Vec<String>,
}

/// One page of `/api/post/item_list/`.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemListPage {
    #[serde(default)]
    pub item_list: Vec<RawItem>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub create_time: Option<i64>,
    pub video: Option<RawVideo>,
    pub author: Option<AuthorField>,
    pub stats: Option<RawItemStats>,
    pub music: Option<RawMusic>,
    // Flat author fields of legacy `ItemModule` entries.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub author_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar_thumb: Option<String>,
}

/// Current pages embed a full author object, the legacy layout only its handle.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum AuthorField {
    Full(RawAuthor),
    Handle(String),
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawVideo {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub height: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub width: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub duration: Option<u64>,
    pub ratio: Option<String>,
    pub cover: Option<String>,
    pub dynamic_cover: Option<String>,
    pub play_addr: Option<String>,
    pub download_addr: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawItemStats {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub digg_count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub share_count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub comment_count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub play_count: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthor {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    pub unique_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar_thumb: Option<String>,
    pub avatar_larger: Option<String>,
    pub signature: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub create_time: Option<i64>,
    pub verified: Option<bool>,
    pub sec_uid: Option<String>,
    pub private_account: Option<bool>,
    pub bio_link: Option<RawBioLink>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawBioLink {
    pub link: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawUserStats {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub follower_count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub following_count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub heart_count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub video_count: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawMusic {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub play_url: Option<String>,
    pub cover_large: Option<String>,
    pub cover_thumb: Option<String>,
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub duration: Option<u64>,
    pub original: Option<bool>,
    pub album: Option<String>,
}
