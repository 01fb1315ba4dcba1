//! URL query strings into engine parameters.

use catalog_engine::RawParams;

/// Decodes `a=1&b=x%20y` into raw parameters.
///
/// A leading `?` is ignored. A key given more than once keeps every value, comma-joined in
/// order, so `Merk=Daikin&Merk=LG` selects the same set as `Merk=Daikin,LG`.
pub fn parse(query: &str) -> RawParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = RawParams::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .and_modify(|existing: &mut String| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone().into_owned());
    }
    params
}
