//! Joining relative routes onto a base address.

use reqwest::Url;

/// Append `segments` to the path of `base`.
///
/// Each segment is percent-encoded by [`Url::path_segments_mut`], so a `/`
/// or `?` inside one stays inside it. Empty segments are skipped and dot
/// segments are refused.
pub fn join_segments<'a, I>(base: &Url, segments: I) -> Result<Url, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| format!("'{base}' cannot carry a path"))?;
        path.pop_if_empty();
        for segment in segments.into_iter().filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(format!("dot segment '{segment}' is not allowed"));
            }
            path.push(segment);
        }
    }
    Ok(url)
}
