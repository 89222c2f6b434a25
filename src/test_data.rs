#[cfg(test)]
pub const THEME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Tech</title>
</head>
<body>
  <h1>Tech</h1>
  <p>Posts about technology.</p>
</body>
</html>
"#;

#[cfg(test)]
pub const THEME_PAGE_WITH_BLOGS: &str = r#"<html>
<body>
  <h2>Recent Blogs</h2>
  <ul>
    <li><a href="blogs/tech/2025-01-05.html">Jan 5: Hello</a></li>
  </ul>
</body>
</html>
"#;
