//! Server-rendered HTML for realm entry pages.
//!
//! The sealed page is the same bytes for every refusal (locked realm,
//! unknown realm, no session), so a refusal never reveals which realms
//! exist or what they look like.

use yggdrasil_realm::Realm;

/// Page served with 403 whenever a realm may not be entered.
pub const SEALED_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Yggdrasil - The Way Is Sealed</title>
</head>
<body class="sealed">
<main>
<h1>The way is sealed</h1>
<p>The branches of the World Tree do not open for you yet.
Prove yourself in the realm before this one and return.</p>
<p><a href="/">Return to the roots</a></p>
</main>
</body>
</html>
"#;

/// Entry page for an unlocked realm.
pub fn realm_page(realm: Realm) -> String {
    let meta = realm.metadata();
    let theme = &meta.theme;
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Yggdrasil - {name}</title>
<style>:root {{ --realm-color: {color}; }}</style>
</head>
<body data-realm="{slug}" data-order="{order}">
<main>
<img src="{image}" alt="{name}">
<h1>{name}</h1>
<p class="category">{category}</p>
<p>{description}</p>
<form method="post" action="/submit-flag" id="flag-form">
<input name="flag" placeholder="YGGDRASIL{{REALM:uuid}}" autocomplete="off">
<button type="submit">Submit flag</button>
</form>
</main>
</body>
</html>
"#,
        name = meta.display_name,
        color = theme.primary_color,
        slug = realm.name(),
        order = realm.order(),
        image = theme.image,
        category = theme.category,
        description = meta.description,
    )
}
