//! Stylesheets served with every view

/// Screen theme for the default and slide views
pub const THEME_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; }
html { -webkit-text-size-adjust: 100%; }
body {
  margin: 0;
  font-family: "Roboto", "Helvetica", "Arial", sans-serif;
  font-size: 1rem;
  line-height: 1.5;
  color: rgba(0, 0, 0, 0.87);
  background-color: #fafafa;
}
h1, h2, h3, h4, h5, h6 { font-weight: 400; line-height: 1.2; margin: 1.2em 0 0.6em; }
h1 { font-size: 2.6rem; font-weight: 300; }
h2 { font-size: 2rem; }
h3 { font-size: 1.5rem; }
a { color: #1976d2; }
code, pre { font-family: "Roboto Mono", ui-monospace, monospace; }
pre { background: #f0f0f0; padding: 1rem; overflow-x: auto; border-radius: 4px; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid #e0e0e0; padding: 0.4rem 0.8rem; }
img { max-width: 100%; }
.mdx-viewer { max-width: 960px; margin: 0 auto; padding: 2rem 1.5rem; }
.slide-page, .print-slide {
  width: 100vw;
  min-height: 100vh;
  padding: 4rem 6rem;
  background: #ffffff;
}
.print-slide { page-break-after: always; min-height: auto; aspect-ratio: 16 / 9; }
.title-slide { text-align: center; padding: 20vh 2rem; }
.diagnostic { margin: 2rem; color: #b71c1c; background: #fff5f5; border: 1px solid #f5c6cb; }
.error-boundary { margin: 2rem; padding: 1rem 1.5rem; border-left: 4px solid #b71c1c; background: #ffffff; }
.error-boundary button { font: inherit; padding: 0.4rem 1rem; cursor: pointer; }
"#;

/// Print stylesheet handed to the paginator for `format=doc`
pub const PRINT_CSS: &str = r#"
@page {
  size: A4;
  margin: 20mm 18mm 22mm;
  @bottom-center { content: counter(page) " / " counter(pages); font-size: 9pt; }
}
body { font-family: "Roboto", "Helvetica", "Arial", sans-serif; font-size: 11pt; line-height: 1.45; }
h1 { break-before: page; font-size: 22pt; font-weight: 400; }
h1:first-of-type { break-before: avoid; }
h2, h3 { break-after: avoid; }
pre, table, img { break-inside: avoid; }
pre { background: #f4f4f4; padding: 6pt; font-size: 9pt; white-space: pre-wrap; }
table { border-collapse: collapse; }
th, td { border: 0.5pt solid #999; padding: 3pt 6pt; }
"#;
