mod admin;
mod article;
mod contact;
mod query;

pub use self::{
    admin::{AdminUser, NewAdmin},
    article::{Article, ArticleChanges, Category, NewArticle},
    contact::ContactMessage,
    query::{ArticleFilter, ArticleQuery, CategoryStat, SortKey},
};
