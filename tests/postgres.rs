#![cfg(feature = "db_tests")]

use chrono::{Duration, Utc};

use newsdesk::{
    accounts::{AccountState, AdminAccounts, LoginForm},
    analytics::Dashboard,
    bootstrap,
    content::{ArticleChanges, ArticleFilter, ArticleQuery, Category, ContactMessage, NewArticle, SortKey},
    contact,
    storage::{DBPool, NewsStore, migrate, migrate_sql, new_db_pool},
};

async fn test_db() -> DBPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db = new_db_pool(&url).await.expect("连接数据库失败");
    migrate(&db).await.expect("初始化sql失败");
    migrate_sql(&db, "TRUNCATE news, admin_users, contacts")
        .await
        .expect("清空数据失败");
    db
}

#[tokio::test]
#[ignore = "依赖真实数据库"]
async fn test_postgres_store() {
    let db = test_db().await;

    // 建表语句可以重复执行
    migrate(&db).await.unwrap();

    assert_eq!(bootstrap::seed_articles(&db).await.unwrap(), 4);
    assert!(bootstrap::ensure_default_admin(&db).await.unwrap());
    assert!(!bootstrap::ensure_default_admin(&db).await.unwrap());

    let accounts = AdminAccounts::new(&db);
    assert_eq!(accounts.state().await.unwrap(), AccountState::AdminExists);
    let claims = accounts
        .login(&LoginForm {
            username: bootstrap::DEFAULT_ADMIN_USERNAME.into(),
            password: bootstrap::DEFAULT_ADMIN_PASSWORD.into(),
        })
        .await
        .unwrap();
    accounts.authenticate(&claims).await.unwrap();

    // 创建时间相同的文章在分页窗口之间既不重复也不遗漏
    let mut paged = Vec::new();
    for skip in 0..4 {
        let page = db
            .query_articles(&ArticleQuery::newest().skip(skip).limit(1))
            .await
            .unwrap();
        paged.extend(page.into_iter().map(|a| a.id));
    }
    paged.sort();
    paged.dedup();
    assert_eq!(paged.len(), 4);

    // 按浏览量排序
    let popular = db
        .query_articles(&ArticleQuery::sorted_by(SortKey::Views).limit(2))
        .await
        .unwrap();
    assert_eq!(popular[0].views, 203);
    assert_eq!(popular[1].views, 150);

    // 大小写不敏感的全文匹配
    let found = db
        .query_articles(&ArticleQuery::newest().filter(ArticleFilter::default().text("CLIMATE")))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].category, Category::Political);

    let id = found[0].id;
    let viewed = db.increment_views(id).await.unwrap().unwrap();
    assert_eq!(viewed.views, 121);

    // 更新时间早于创建时间时取创建时间，未给图片时保留原图
    let changes = ArticleChanges {
        title: "Summit ends".into(),
        content: "Agreement reached.".into(),
        category: Category::Political,
        image: None,
        updated_at: viewed.date_created - Duration::hours(1),
    };
    let updated = db.update_article(id, &changes).await.unwrap().unwrap();
    assert_eq!(updated.title, "Summit ends");
    assert_eq!(updated.date_updated, updated.date_created);
    assert_eq!(updated.image, None);

    let stats = db.category_stats().await.unwrap();
    assert_eq!(stats.len(), 4);
    assert!(stats.iter().all(|s| s.count == 1));

    let dashboard = Dashboard::compute(&db, Utc::now()).await.unwrap();
    assert_eq!(dashboard.total_articles, 4);
    assert_eq!(dashboard.total_views, 150 + 89 + 203 + 121);
    assert_eq!(dashboard.today_views, dashboard.total_views);
    assert_eq!(dashboard.articles_with_images, 0);

    let image_id = db
        .insert_article(
            NewArticle::new("With image", "Body", Category::Sports, "Admin", Utc::now())
                .with_image(Some("cover.png".into())),
        )
        .await
        .unwrap()
        .id;
    assert_eq!(
        db.count_articles(&ArticleFilter::default().with_image())
            .await
            .unwrap(),
        1
    );

    let removed = db.delete_article(image_id).await.unwrap().unwrap();
    assert_eq!(removed.image.as_deref(), Some("cover.png"));
    assert!(db.delete_article(image_id).await.unwrap().is_none());
    assert!(db.find_article(image_id).await.unwrap().is_none());

    contact::submit(
        &db,
        ContactMessage {
            name: "Reader".into(),
            email: "reader@example.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
}
