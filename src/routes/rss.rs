use axum::{extract::State, http::header, response::IntoResponse};
use chrono::{DateTime, Utc};

use crate::db::models::{BlogPost, PostQuery};
use crate::error::AppError;
use crate::AppState;

const FEED_LIMIT: i64 = 50;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

fn render_item(base_url: &str, post: &BlogPost) -> String {
    let post_url = format!("{}/blog/{}", base_url, post.id);
    format!(
        "    <item>\n\
               <title>{}</title>\n\
               <link>{}</link>\n\
               <description>{}</description>\n\
               <category>{}</category>\n\
               <pubDate>{}</pubDate>\n\
               <guid isPermaLink=\"true\">{}</guid>\n\
             </item>\n",
        escape_xml(&post.title),
        escape_xml(&post_url),
        escape_xml(&post.excerpt),
        escape_xml(post.category.label()),
        rfc822(&post.created_at),
        escape_xml(&post_url),
    )
}

/// GET /rss.xml - Published posts, newest first
pub async fn rss_feed(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state
        .store
        .list_posts(&PostQuery {
            limit: Some(FEED_LIMIT),
            ..PostQuery::published()
        })
        .await?;

    let site = &state.config.site;
    let base_url = site.url.trim_end_matches('/');
    let items: String = posts.iter().map(|post| render_item(base_url, post)).collect();

    let feed_url = format!("{}/rss.xml", base_url);
    let blog_url = format!("{}/blog", base_url);

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&site.title),
        escape_xml(&blog_url),
        escape_xml(&site.description),
        escape_xml(&feed_url),
        posts
            .first()
            .map(|post| rfc822(&post.created_at))
            .unwrap_or_default(),
        items,
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=600",
            ),
        ],
        xml,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{BlogCategory, NewBlogPost};
    use crate::db::ContentStore;
    use crate::testing::{send, TestApp};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<title>"), "&lt;title&gt;");
        assert_eq!(escape_xml("\"quote\""), "&quot;quote&quot;");
    }

    #[test]
    fn test_rfc822_format() {
        use chrono::TimeZone;
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(rfc822(&dt), "Mon, 15 Jan 2024 12:00:00 +0000");
    }

    fn post(title: &str, published: bool) -> NewBlogPost {
        NewBlogPost {
            title: title.to_string(),
            excerpt: format!("{} & more", title),
            content: "<p>body</p>".to_string(),
            category: BlogCategory::AiMl,
            read_time: "4 min read".to_string(),
            image: None,
            published,
        }
    }

    #[tokio::test]
    async fn test_feed_lists_published_posts_only() {
        let app = TestApp::new().await;
        let live = app.content.insert_post(post("Shipping", true)).await.unwrap();
        app.content.insert_post(post("Draft notes", false)).await.unwrap();

        let req = Request::get("/rss.xml").body(Body::empty()).unwrap();
        let (status, bytes) = send(app.router(), req).await;
        assert_eq!(status, StatusCode::OK);

        let xml = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(xml.contains("<title>Shipping</title>"));
        assert!(xml.contains("Shipping &amp; more"));
        assert!(xml.contains(&format!("https://portfolio.test/blog/{}", live.id)));
        assert!(xml.contains("<category>AI &amp; ML</category>"));
        assert!(!xml.contains("Draft notes"));
    }
}
