//! File output: Markdown, JSON, and standalone HTML documents with
//! timestamped filenames.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indoc::indoc;
use subst::substitute;

use crate::errors::Result;
use crate::pipeline::ArticleOutput;

// The processed body is embedded as-is; converting it again would mangle the
// inline HTML the post-processor produced.
const HTML_DOCUMENT: &str = indoc! { r#"
  <!DOCTYPE html>
  <html lang="ja">
  <head>
      <meta charset="UTF-8">
      <meta name="viewport" content="width=device-width, initial-scale=1.0">
      <meta name="description" content="${META_DESCRIPTION}">
      <title>${TITLE}</title>
      <style>
          * { box-sizing: border-box; }
          body {
              font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Hiragino Sans', 'Noto Sans JP', sans-serif;
              line-height: 1.8;
              color: #333;
              background: #f5f5f5;
              margin: 0;
              padding: 20px;
          }
          .container {
              max-width: 800px;
              margin: 0 auto;
              background: #fff;
              padding: 40px;
              border-radius: 12px;
              box-shadow: 0 2px 20px rgba(0,0,0,0.08);
          }
          h1 { font-size: 1.8em; color: #1a1a1a; border-bottom: 3px solid #667eea; padding-bottom: 15px; margin-bottom: 25px; }
          h2 { font-size: 1.4em; color: #333; margin-top: 40px; padding-left: 15px; border-left: 4px solid #667eea; }
          h3 { font-size: 1.2em; color: #444; margin-top: 30px; }
          p { margin: 1em 0; }
          ul { padding-left: 25px; }
          li { margin: 8px 0; }
          hr { border: none; border-top: 1px solid #e0e0e0; margin: 40px 0; }
          a { color: #667eea; text-decoration: none; }
          a:hover { text-decoration: underline; }
          img { max-width: 100%; height: auto; }
          blockquote {
              margin: 15px 0;
              padding: 15px 20px;
              background: #f9f9f9;
              border-left: 4px solid #667eea;
              font-style: italic;
          }
          .cta-button {
              display: inline-block;
              background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
              color: white !important;
              padding: 16px 32px;
              border-radius: 30px;
              text-decoration: none !important;
              font-weight: bold;
              box-shadow: 0 4px 15px rgba(102,126,234,0.4);
              transition: transform 0.2s, box-shadow 0.2s;
          }
          .cta-button:hover { transform: translateY(-2px); box-shadow: 0 6px 20px rgba(102,126,234,0.5); }
          .cta-container { text-align: center; margin: 30px 0; }
          @media (max-width: 600px) {
              body { padding: 10px; }
              .container { padding: 20px; }
              h1 { font-size: 1.5em; }
          }
      </style>
  </head>
  <body>
      <div class="container">
          ${BODY}
      </div>
  </body>
  </html>
"# };

/// Renders a processed article body into a standalone HTML document.
///
/// # Errors
///
/// Returns an error if template substitution fails.
pub fn render_html_document(title: &str, meta_description: &str, body: &str) -> Result<String> {
    let mut vars = HashMap::new();
    vars.insert("TITLE".to_string(), title.to_string());
    vars.insert("META_DESCRIPTION".to_string(), meta_description.to_string());
    vars.insert("BODY".to_string(), body.to_string());
    Ok(substitute(HTML_DOCUMENT, &vars)?)
}

/// Timestamped filename stem for one page's output files.
pub fn timestamped_stem(page_id: i32) -> String {
    format!("article_{page_id}_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// Writes the JSON, Markdown, and HTML renditions of a generated article and
/// returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file write fails.
pub fn write_article_files(dir: &Path, stem: &str, article: &ArticleOutput) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let json_path = dir.join(format!("{stem}.json"));
    std::fs::write(&json_path, serde_json::to_string_pretty(article)?)?;

    let md_path = dir.join(format!("{stem}.md"));
    std::fs::write(&md_path, &article.content)?;

    let html_path = dir.join(format!("{stem}.html"));
    let html = render_html_document(&article.title, &article.meta_description, &article.content)?;
    std::fs::write(&html_path, html)?;

    Ok(vec![json_path, md_path, html_path])
}
