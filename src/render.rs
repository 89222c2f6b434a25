use std::io;
use std::io::ErrorKind;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use ramhorns::Template;

use crate::dates::long_date;

// Title and content are trusted HTML, so both use the unescaped form
const POST_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>{{{post_title}}}</title>
  <style>
    body {
      font-family: Arial, sans-serif;
      max-width: 700px;
      margin: 2rem auto;
      padding: 1rem;
      background: #f9f9f9;
      line-height: 1.6;
    }
    h1 { color: #007acc; }
    a { color: #007acc; text-decoration: none; }
    a:hover { text-decoration: underline; }
    em { color: #555; }
    .date { color: #666; margin-bottom: 1rem; }
    .back-link { margin-bottom: 2rem; }
  </style>
</head>
<body>
  <div class="back-link">
    <a href="../../index.html">← Back to Home</a>
  </div>
  <h1>{{{post_title}}}</h1>
  <div class="date">{{date}}</div>
  <div class="content">
    {{{post_content}}}
  </div>
</body>
</html>
"##;

lazy_static! {
    static ref DEFAULT_RENDERER: PostRenderer<'static> = PostRenderer::new(POST_TEMPLATE).unwrap();
}

#[derive(ramhorns::Content)]
struct PostView<'a> {
    post_title: &'a str,
    post_content: &'a str,
    date: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(post_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(post_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, title: &str, content: &str, date: &DateTime<Utc>) -> String {
        let date = long_date(date);
        self.template.render(&PostView {
            post_title: title,
            post_content: content,
            date: date.as_str(),
        })
    }
}

/// Renders a standalone post page with the built-in stylesheet
pub fn render_post(title: &str, content: &str, date: &DateTime<Utc>) -> String {
    DEFAULT_RENDERER.render(title, content, date)
}
