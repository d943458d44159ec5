use crate::core::context::INJECTION_MARKER;
use crate::scanner::params::{ParamOrigin, ParameterCandidate};
use url::Url;

/// Set `param` to `payload` in the query string, appending it when absent.
/// Every existing occurrence of the key is overwritten.
pub fn inject_query_param(base: &Url, param: &str, payload: &str) -> Url {
    let mut url = base.clone();
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut found = false;

    for (k, v) in pairs.iter_mut() {
        if k == param {
            *v = payload.to_string();
            found = true;
        }
    }

    if !found {
        pairs.push((param.to_string(), payload.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}

/// Replace path segment `index` with the percent-encoded payload.
/// Returns `None` when the URL has no such segment.
pub fn inject_path_segment(base: &Url, index: usize, payload: &str) -> Option<Url> {
    let mut segments: Vec<String> = base.path_segments()?.map(String::from).collect();
    let slot = segments.get_mut(index)?;
    *slot = urlencoding::encode(payload).into_owned();

    let mut url = base.clone();
    url.set_path(&format!("/{}", segments.join("/")));
    Some(url)
}

/// Test URL for one candidate: query candidates are set in place, path
/// candidates rewrite their segment, anything else is appended as a new
/// query parameter.
pub fn build_test_url(base: &Url, candidate: &ParameterCandidate, payload: &str) -> Url {
    if candidate.origin == ParamOrigin::PathSegment {
        if let Some(url) = candidate
            .path_index
            .and_then(|idx| inject_path_segment(base, idx, payload))
        {
            return url;
        }
    }

    inject_query_param(base, &candidate.name, payload)
}

/// The operator-marked injection point, if the URL carries the marker in a
/// query value or a path segment. Query values win over path segments.
pub fn find_marked_parameter(url: &Url) -> Option<ParameterCandidate> {
    if let Some((key, _)) = url
        .query_pairs()
        .find(|(_, v)| v.contains(INJECTION_MARKER))
    {
        return Some(ParameterCandidate::new(key.to_string(), ParamOrigin::Query));
    }

    url.path_segments()?
        .position(|s| s.contains(INJECTION_MARKER))
        .map(|idx| ParameterCandidate::path(format!("path{}_marked", idx), idx))
}
