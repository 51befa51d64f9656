//! Handlebars templates for the page chrome
//!
//! Values are HTML-escaped by `{{ }}`; only rendered artifact HTML and the
//! theme stylesheet go through `{{{ }}}`. Scripts read their inputs from
//! `data-*` attributes and never contain template expressions.

pub const PAGE: &str = "page";
pub const DOCUMENT: &str = "document";
pub const DIAGNOSTIC: &str = "diagnostic";
pub const ERROR: &str = "error";

pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>{{{css}}}</style>
</head>
<body data-format="{{format}}" data-generation="{{generation}}" data-generation-url="{{generation_url}}" data-poll-ms="{{poll_ms}}">
{{{body}}}<script>
(function () {
  var data = document.body.dataset;
  var generation = Number(data.generation);
  setInterval(function () {
    fetch(data.generationUrl)
      .then(function (res) { return res.json(); })
      .then(function (next) { if (next.generation !== generation) { window.location.reload(); } })
      .catch(function () {});
  }, Number(data.pollMs));
})();
</script>
</body>
</html>
"#;

pub const DOCUMENT_TEMPLATE: &str = r#"<div id="mdx-source" style="display: none">
{{{content}}}</div>
<div class="pagedjs_page" id="mdx-preview" data-stylesheet="{{stylesheet}}"></div>
<script>window.PagedConfig = { auto: false };</script>
<script src="{{script}}"></script>
<script>
(function () {
  var source = document.getElementById("mdx-source");
  var target = document.getElementById("mdx-preview");
  new Paged.Previewer().preview(source.innerHTML, [target.dataset.stylesheet], target);
  window.addEventListener("beforeunload", function () {
    document.head.querySelectorAll("[data-pagedjs-inserted-styles]").forEach(function (e) {
      if (e.parentNode) { e.parentNode.removeChild(e); }
    });
  });
})();
</script>
"#;

pub const DIAGNOSTIC_TEMPLATE: &str = r#"<pre class="diagnostic"><code>{{message}}</code></pre>
"#;

pub const ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Something went wrong</title>
<style>{{{css}}}</style>
</head>
<body>
<div role="alert" class="error-boundary">
<p>Something went wrong:</p>
<pre>{{message}}</pre>
<form method="{{method}}" action="{{action}}"><button type="submit">Try again</button></form>
</div>
</body>
</html>
"#;
