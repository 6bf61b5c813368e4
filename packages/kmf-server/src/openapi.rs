use serde_json::{json, Value};

pub const DOC_PATH: &str = "/doc";

/// OpenAPI 3.1 description of the public surface.
pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Kmf Station Update Bot",
            "version": "v1"
        },
        "components": {
            "securitySchemes": {
                "Bearer": {
                    "type": "http",
                    "scheme": "bearer"
                }
            }
        },
        "paths": {
            "/update": {
                "post": {
                    "security": [{ "Bearer": [] }],
                    "responses": {
                        "200": { "description": "Update task emitted." },
                        "401": { "description": "Unauthorized." }
                    }
                }
            }
        }
    })
}

pub fn swagger_ui_html(doc_url: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>SwaggerUI</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css" />
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin="anonymous"></script>
    <script>
      window.onload = () => {{
        window.ui = SwaggerUIBundle({{ dom_id: '#swagger-ui', url: '{}' }});
      }};
    </script>
  </body>
</html>
"#,
        doc_url
    )
}
