//! Server-rendered HTML: gallery listing, single viewer, side-by-side compare.
//!
//! Tile rendering is left entirely to OpenSeadragon in the browser; these
//! pages only wire it to a dataset's manifest and to the JSON endpoints.

use crate::config::ComparisonPairs;

const OSD_SCRIPT: &str =
    "https://cdn.jsdelivr.net/npm/openseadragon@4.1.1/build/openseadragon/openseadragon.min.js";
const OSD_IMAGES: &str = "https://cdn.jsdelivr.net/npm/openseadragon@4.1.1/build/openseadragon/images/";

const THEME_CSS: &str = r#"
  :root { --background: hsl(222.2 84% 4.9%); --foreground: hsl(210 40% 98%); --muted: hsl(217.2 32.6% 17.5%);
          --muted-foreground: hsl(215 20.2% 65.1%); --primary: hsl(217.2 91.2% 59.8%);
          --primary-foreground: hsl(210 40% 98%); --border: hsl(217.2 32.6% 17.5%); --radius: 0.5rem; }
  body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
         margin: 0; background: var(--background); color: var(--foreground); }
  a { color: inherit; }
"#;

pub fn gallery(datasets: &[String], pairs: &ComparisonPairs) -> String {
    let items = if datasets.is_empty() {
        "<p class=\"empty\">No processed image folders found in the tiles directory.</p>".to_string()
    } else {
        let cards: String = datasets
            .iter()
            .map(|name| gallery_card(name, pairs.partner(name)))
            .collect();
        format!("<ul>{}</ul>", cards)
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>Satellite Image Gallery</title>
  <style>{theme}
  body {{ padding: 2rem; }}
  .container {{ max-width: 900px; margin: 2rem auto; padding: 2rem; border-radius: var(--radius); border: 1px solid var(--border); }}
  h1 {{ text-align: center; }}
  ul {{ list-style-type: none; padding: 0; }}
  li {{ display: flex; gap: 0.5rem; margin-bottom: 0.5rem; }}
  li a {{ display: block; padding: 1rem; border-radius: var(--radius); background: var(--muted); text-decoration: none; transition: background-color 0.2s; }}
  li a.open {{ flex: 1; }}
  li a:hover {{ background-color: var(--primary); color: var(--primary-foreground); }}
  .empty {{ text-align: center; color: var(--muted-foreground); }}
  </style>
</head>
<body>
  <div class="container">
    <h1>Available Images</h1>
    {items}
  </div>
</body>
</html>"#,
        theme = THEME_CSS,
        items = items,
    )
}

fn gallery_card(name: &str, partner: Option<&str>) -> String {
    let compare = partner
        .map(|other| {
            format!(
                r#"<a class="compare" href="/compare/{}/{}">Compare with {}</a>"#,
                href_segment(name),
                href_segment(other),
                html_escape(other)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<li><a class="open" href="/viewer/{href}">{label}</a>{compare}</li>"#,
        href = href_segment(name),
        label = html_escape(name),
        compare = compare,
    )
}

pub fn viewer(name: &str, manifest_url: &str, compare_with: Option<&str>) -> String {
    let compare_link = compare_with
        .map(|other| {
            format!(
                r#"<a class="button" href="/compare/{}/{}">Compare with {}</a>"#,
                href_segment(name),
                href_segment(other),
                html_escape(other)
            )
        })
        .unwrap_or_default();

    format!(
        r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>Viewer - {title}</title>
  <script src="{osd_script}"></script>
  <style>{theme}
  html, body {{ width: 100%; height: 100%; }}
  #viewer {{ position: absolute; inset: 0 320px 0 0; background: #000; }}
  #panel {{ position: absolute; top: 0; right: 0; bottom: 0; width: 320px; box-sizing: border-box; padding: 1rem;
            overflow-y: auto; border-left: 1px solid var(--border); }}
  #panel h2 {{ font-size: 1rem; margin: 1rem 0 0.5rem; }}
  #annotations li {{ cursor: pointer; padding: 0.25rem 0; }}
  .marker {{ width: 14px; height: 14px; border-radius: 50%; background: var(--primary); border: 2px solid #fff; }}
  textarea {{ width: 100%; box-sizing: border-box; min-height: 4rem; }}
  .button, button {{ display: inline-block; padding: 0.4rem 0.8rem; border-radius: var(--radius); border: none;
                    background: var(--primary); color: var(--primary-foreground); text-decoration: none; cursor: pointer; }}
  #answer {{ white-space: pre-wrap; color: var(--muted-foreground); }}
  </style>
</head>
<body>
  <div id="viewer"></div>
  <div id="panel">
    <a href="/">&larr; Gallery</a>
    <h1>{title}</h1>
    {compare_link}
    <h2>Annotations</h2>
    <label><input type="checkbox" id="annotate-mode"/> Click image to annotate</label>
    <ul id="annotations"></ul>
    <h2>Ask about this view</h2>
    <form id="ask-form">
      <textarea id="question" placeholder="What landforms are visible here?"></textarea>
      <button type="submit">Ask</button>
    </form>
    <p id="answer"></p>
  </div>
  <script>
  const DATASET = {name_js};
  const viewer = OpenSeadragon({{
    id: "viewer",
    prefixUrl: "{osd_images}",
    tileSources: {manifest_js},
    showNavigator: true,
    crossOriginPolicy: "Anonymous"
  }});
  const list = document.getElementById("annotations");
  const annotateMode = document.getElementById("annotate-mode");
  const annotationsUrl = "/annotations/" + encodeURIComponent(DATASET);

  function addMarker(a) {{
    if (typeof a.x !== "number" || typeof a.y !== "number") return;
    const el = document.createElement("div");
    el.className = "marker";
    el.title = a.text || "";
    viewer.addOverlay({{ element: el, location: new OpenSeadragon.Point(a.x, a.y), placement: OpenSeadragon.Placement.CENTER }});
    const li = document.createElement("li");
    li.textContent = a.text || "(no label)";
    li.onclick = () => viewer.viewport.panTo(new OpenSeadragon.Point(a.x, a.y));
    list.appendChild(li);
  }}

  viewer.addHandler("open", () => {{
    fetch(annotationsUrl, {{ cache: "no-store" }})
      .then(r => r.ok ? r.json() : [])
      .then(items => items.forEach(addMarker));
  }});

  viewer.addHandler("canvas-click", (e) => {{
    if (!annotateMode.checked || !e.quick) return;
    e.preventDefaultAction = true;
    const p = viewer.viewport.pointFromPixel(e.position);
    const text = prompt("Annotation label:");
    if (!text) return;
    const a = {{ x: p.x, y: p.y, text: text }};
    fetch(annotationsUrl, {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify(a)
    }}).then(r => r.ok ? addMarker(a) : r.json().then(b => alert(b.error)));
  }});

  document.getElementById("ask-form").addEventListener("submit", async (ev) => {{
    ev.preventDefault();
    const answer = document.getElementById("answer");
    const question = document.getElementById("question").value.trim();
    if (!question) return;
    let image;
    try {{
      image = viewer.drawer.canvas.toDataURL("image/png");
    }} catch (err) {{
      answer.textContent = "Could not capture the current view: " + err;
      return;
    }}
    answer.textContent = "Thinking...";
    const r = await fetch("/ask/" + encodeURIComponent(DATASET), {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify({{ question: question, image_base_64: image }})
    }});
    const body = await r.json();
    answer.textContent = r.ok ? body.answer : "Error: " + body.error;
  }});
  </script>
</body>
</html>"##,
        title = html_escape(name),
        theme = THEME_CSS,
        osd_script = OSD_SCRIPT,
        osd_images = OSD_IMAGES,
        compare_link = compare_link,
        name_js = js_string(name),
        manifest_js = js_string(manifest_url),
    )
}

pub fn compare(left: &str, right: &str, left_manifest: &str, right_manifest: &str) -> String {
    format!(
        r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>Compare - {left_title} / {right_title}</title>
  <script src="{osd_script}"></script>
  <style>{theme}
  html, body {{ width: 100%; height: 100%; }}
  header {{ height: 3rem; display: flex; align-items: center; gap: 1rem; padding: 0 1rem; border-bottom: 1px solid var(--border); }}
  .panes {{ position: absolute; top: 3rem; bottom: 0; left: 0; right: 0; display: flex; }}
  .pane {{ flex: 1; position: relative; background: #000; border-right: 1px solid var(--border); }}
  .pane span {{ position: absolute; top: 0.5rem; left: 0.5rem; z-index: 10; background: var(--muted); padding: 0.2rem 0.5rem; border-radius: var(--radius); }}
  .pane div {{ width: 100%; height: 100%; }}
  </style>
</head>
<body>
  <header><a href="/">&larr; Gallery</a><label><input type="checkbox" id="sync" checked/> Sync pan &amp; zoom</label></header>
  <div class="panes">
    <div class="pane"><span><a href="/viewer/{left_href}">{left_title}</a></span><div id="left"></div></div>
    <div class="pane"><span><a href="/viewer/{right_href}">{right_title}</a></span><div id="right"></div></div>
  </div>
  <script>
  const options = {{ prefixUrl: "{osd_images}", showNavigator: true }};
  const left = OpenSeadragon(Object.assign({{ id: "left", tileSources: {left_js} }}, options));
  const right = OpenSeadragon(Object.assign({{ id: "right", tileSources: {right_js} }}, options));
  const sync = document.getElementById("sync");
  let leading = null;

  function follow(source, target) {{
    const handler = () => {{
      if (!sync.checked || (leading && leading !== source)) return;
      leading = source;
      target.viewport.zoomTo(source.viewport.getZoom());
      target.viewport.panTo(source.viewport.getCenter());
      leading = null;
    }};
    source.addHandler("zoom", handler);
    source.addHandler("pan", handler);
  }}
  follow(left, right);
  follow(right, left);
  </script>
</body>
</html>"##,
        left_title = html_escape(left),
        right_title = html_escape(right),
        left_href = href_segment(left),
        right_href = href_segment(right),
        theme = THEME_CSS,
        osd_script = OSD_SCRIPT,
        osd_images = OSD_IMAGES,
        left_js = js_string(left_manifest),
        right_js = js_string(right_manifest),
    )
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Dataset name as a single URL path segment inside an HTML attribute.
fn href_segment(name: &str) -> String {
    html_escape(&urlencoding::encode(name))
}

/// JSON string literal that is also safe inside a `<script>` element.
fn js_string(input: &str) -> String {
    serde_json::Value::from(input)
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}
