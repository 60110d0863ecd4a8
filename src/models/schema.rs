//! Property names of the remote tables.
//!
//! The store is schemaless from our side; these names are the contract with
//! the people editing the tables.

/// The properties a view needs to filter and sort a table generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub published: &'static str,
    pub name: &'static str,
    pub categories: Option<&'static str>,
    pub recency: Option<&'static str>,
    pub views: Option<&'static str>,
    pub revenue: Option<&'static str>,
    pub order: Option<&'static str>,
}

pub mod person {
    pub const NAME: &str = "人名";
    pub const IMAGE: &str = "プロフィール画像";
    pub const DESCRIPTION: &str = "説明文";
    pub const BIRTH_DATE: &str = "生年月日";
    pub const HEIGHT: &str = "身長";
    pub const MEASUREMENTS: &str = "スリーサイズ";
    pub const CUP_SIZE: &str = "カップ数";
    pub const ORIGIN: &str = "出身";
    pub const CATEGORIES: &str = "カテゴリ";
    pub const GENRES: &str = "ジャンル";
    pub const PROFILE_LINK: &str = "FANZAリンク";
    pub const CONTENTS: &str = "コンテンツ";
    pub const VIEWS: &str = "閲覧数";
    pub const REVENUE: &str = "売上";
    pub const PUBLISHED: &str = "公開ステータス";
}

pub mod content {
    pub const TITLE: &str = "タイトル";
    pub const THUMBNAIL: &str = "サムネイル";
    pub const DESCRIPTION: &str = "説明文";
    pub const RELEASE_DATE: &str = "公開日";
    pub const VIEWS: &str = "閲覧数";
    pub const REVENUE: &str = "売上";
    pub const CATEGORIES: &str = "カテゴリ";
    pub const GENRE: &str = "ジャンル";
    pub const PERFORMERS: &str = "出演者";
    pub const AFFILIATE_URL: &str = "アフィリエイトURL";
    pub const MAKER: &str = "メーカー";
    pub const UNIFORM_CATEGORIES: &str = "制服カテゴリ";
    pub const PUBLISHED: &str = "公開ステータス";
}

pub mod genre {
    pub const NAME: &str = "ジャンル名";
    pub const DESCRIPTION: &str = "説明";
    pub const IMAGE: &str = "イメージ画像";
    pub const ORDER: &str = "表示順";
    pub const PUBLISHED: &str = "公開";
}

pub mod uniform {
    pub const NAME: &str = "カテゴリ名";
    pub const SLUG: &str = "スラッグ";
    pub const DESCRIPTION: &str = "説明文";
    pub const IMAGE: &str = "カテゴリ画像";
    pub const ORDER: &str = "表示順";
    pub const PUBLISHED: &str = "公開ステータス";
}

pub mod ranking {
    pub const TITLE: &str = "記事タイトル";
    pub const SLUG: &str = "スラッグ";
    pub const THEME: &str = "テーマ";
    pub const THUMBNAIL: &str = "サムネイル";
    pub const META_DESCRIPTION: &str = "メタディスクリプション";
    pub const INTRO: &str = "導入文";
    pub const CONCLUSION: &str = "まとめ";
    pub const TARGET_TAGS: &str = "対象タグ";
    pub const TARGET_CATEGORIES: &str = "対象カテゴリ";
    pub const SORT: &str = "並び順";
    pub const LIMIT: &str = "表示件数";
    pub const PUBLISHED_DATE: &str = "公開日";
    pub const PUBLISHED: &str = "公開";
}

pub mod ranking_detail {
    pub const LABEL: &str = "名前";
    pub const RANK: &str = "順位";
    pub const BLURB: &str = "コメント";
    pub const PERSON: &str = "人物";
    pub const ARTICLE: &str = "ランキング記事";
}

pub mod review {
    pub const AUTHOR: &str = "投稿者名";
    pub const RATING: &str = "評価";
    pub const BODY: &str = "本文";
    pub const PERSON: &str = "関連人物";
    pub const CONTENT: &str = "関連コンテンツ";
    pub const CREATED_AT: &str = "投稿日時";
    pub const PUBLISHED: &str = "公開ステータス";
}

pub mod affiliate {
    pub const NAME: &str = "ウィジェット名";
    pub const DATA_ID: &str = "data-id";
    pub const KIND: &str = "ウィジェット種類";
    pub const PLACEMENT: &str = "配置場所";
    pub const PUBLISHED: &str = "公開ステータス";
}

pub const PERSON: TableSchema = TableSchema {
    published: person::PUBLISHED,
    name: person::NAME,
    categories: Some(person::CATEGORIES),
    recency: None,
    views: Some(person::VIEWS),
    revenue: Some(person::REVENUE),
    order: None,
};

pub const CONTENT: TableSchema = TableSchema {
    published: content::PUBLISHED,
    name: content::TITLE,
    categories: Some(content::CATEGORIES),
    recency: Some(content::RELEASE_DATE),
    views: Some(content::VIEWS),
    revenue: Some(content::REVENUE),
    order: None,
};

pub const GENRE: TableSchema = TableSchema {
    published: genre::PUBLISHED,
    name: genre::NAME,
    categories: None,
    recency: None,
    views: None,
    revenue: None,
    order: Some(genre::ORDER),
};

pub const UNIFORM_CATEGORY: TableSchema = TableSchema {
    published: uniform::PUBLISHED,
    name: uniform::NAME,
    categories: None,
    recency: None,
    views: None,
    revenue: None,
    order: Some(uniform::ORDER),
};

pub const RANKING: TableSchema = TableSchema {
    published: ranking::PUBLISHED,
    name: ranking::TITLE,
    categories: None,
    recency: Some(ranking::PUBLISHED_DATE),
    views: None,
    revenue: None,
    order: None,
};

pub const AFFILIATE: TableSchema = TableSchema {
    published: affiliate::PUBLISHED,
    name: affiliate::NAME,
    categories: None,
    recency: None,
    views: None,
    revenue: None,
    order: None,
};
