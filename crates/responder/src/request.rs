//! Request data visible to producers.
//!
//! [`RequestContext`] is the slice of the current HTTP request that
//! producers may read: its decoded query string. [`RequestParameters`]
//! projects the two configured query parameters (relations to include,
//! fields to keep) onto it.

use axum::http::Uri;

use crate::config::ResponderConfig;

/// Decoded query parameters of the current request, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    query: Vec<(String, String)>,
}

impl RequestContext {
    /// A request without query parameters. Used outside HTTP handling.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn from_query(query: &str) -> Self {
        let query = url::form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        Self { query }
    }

    /// Reads the query string of `uri`.
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query().map(Self::from_query).unwrap_or_default()
    }

    /// Builds a context from already decoded pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// All query pairs.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Values given for `name`, including the bracketed `name[]` form.
    pub fn values<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
        self.query
            .iter()
            .filter(move |(key, _)| is_parameter(key, name))
            .map(|(_, value)| value.as_str())
    }

    /// First value given for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }
}

/// Matches `name`, `name[]` and `name[<index>]`.
fn is_parameter(key: &str, name: &str) -> bool {
    match key.strip_prefix(name) {
        Some("") => true,
        Some(rest) => rest.starts_with('[') && rest.ends_with(']'),
        None => false,
    }
}

/// The relation-inclusion and field-filter lists of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    relations: Vec<String>,
    fields: Vec<String>,
}

impl RequestParameters {
    /// Reads the lists from the query parameters named `relations_key` and
    /// `fields_key`.
    ///
    /// Values are split on commas and trimmed; blank entries are dropped.
    /// Missing parameters give empty lists. Entries are not validated.
    pub fn extract(request: &RequestContext, relations_key: &str, fields_key: &str) -> Self {
        Self {
            relations: split_list(request, relations_key),
            fields: split_list(request, fields_key),
        }
    }

    /// Reads the lists using the parameter names from `config`.
    pub fn from_config(request: &RequestContext, config: &ResponderConfig) -> Self {
        Self::extract(
            request,
            &config.load_relations_parameter,
            &config.filter_fields_parameter,
        )
    }

    /// Relations to include.
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    /// Fields to keep.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Splits into `(relations, fields)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.relations, self.fields)
    }
}

fn split_list(request: &RequestContext, name: &str) -> Vec<String> {
    request
        .values(name)
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_present_filter_absent() {
        let request = RequestContext::from_query("with=a,b");
        let params = RequestParameters::extract(&request, "with", "only");
        assert_eq!(params.relations(), ["a", "b"]);
        assert!(params.fields().is_empty());
    }

    #[test]
    fn test_both_missing() {
        let params = RequestParameters::extract(&RequestContext::empty(), "with", "only");
        assert_eq!(params, RequestParameters::default());
    }

    #[test]
    fn test_empty_value() {
        let request = RequestContext::from_query("with=&only=");
        let params = RequestParameters::extract(&request, "with", "only");
        assert!(params.relations().is_empty());
        assert!(params.fields().is_empty());
    }

    #[test]
    fn test_repeated_and_bracketed_parameters() {
        let request = RequestContext::from_query("with=books&with[]=publisher&with%5B%5D=awards");
        let params = RequestParameters::extract(&request, "with", "only");
        assert_eq!(params.relations(), ["books", "publisher", "awards"]);
    }

    #[test]
    fn test_trims_and_drops_blanks() {
        let request = RequestContext::from_query("only=%20id%20,,name,");
        let params = RequestParameters::extract(&request, "with", "only");
        assert_eq!(params.fields(), ["id", "name"]);
    }

    #[test]
    fn test_similar_names_not_matched() {
        let request = RequestContext::from_query("without=a&with_x=b");
        let params = RequestParameters::extract(&request, "with", "only");
        assert!(params.relations().is_empty());
    }

    #[test]
    fn test_configured_names() {
        let config = ResponderConfig {
            load_relations_parameter: "include".to_string(),
            filter_fields_parameter: "fields".to_string(),
            ..Default::default()
        };
        let request = RequestContext::from_query("include=books.publisher&fields=id&with=ignored");
        let params = RequestParameters::from_config(&request, &config);
        assert_eq!(params.relations(), ["books.publisher"]);
        assert_eq!(params.fields(), ["id"]);
    }

    #[test]
    fn test_from_uri() {
        let uri: Uri = "/authors?with=books".parse().unwrap();
        let request = RequestContext::from_uri(&uri);
        assert_eq!(request.first("with"), Some("books"));

        let uri: Uri = "/authors".parse().unwrap();
        assert!(RequestContext::from_uri(&uri).query().is_empty());
    }
}
