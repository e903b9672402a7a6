#[cfg(test)]
mod tests {
    use crate::people::{is_person_resource, EmailLookup, EmailResolver, PeopleClient};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_is_person_resource() {
        assert!(is_person_resource("people/123"));
        assert!(!is_person_resource("people/"));
        assert!(!is_person_resource("people/1/extra"));
        assert!(!is_person_resource("alice@example.com"));
    }

    #[tokio::test]
    async fn test_me_reads_account_id_and_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/me"))
            .and(query_param("personFields", "emailAddresses,names"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resourceName": "people/1122334455",
                "emailAddresses": [{ "value": "alice@example.com" }],
                "names": [{ "displayName": "Alice" }]
            })))
            .mount(&server)
            .await;

        let profile = PeopleClient::with_client(reqwest::Client::new(), &server.uri())
            .me("token-1")
            .await
            .unwrap();

        assert_eq!(profile.account_id, "1122334455");
        assert_eq!(profile.email, "alice@example.com");
        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_me_without_email_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resourceName": "people/1"
            })))
            .mount(&server)
            .await;

        let result = PeopleClient::with_client(reqwest::Client::new(), &server.uri())
            .me("token-1")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolver_answers_with_each_callers_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/42"))
            .and(header("authorization", "Bearer token-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resourceName": "people/42"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/people/42"))
            .and(header("authorization", "Bearer token-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resourceName": "people/42",
                "emailAddresses": [{ "value": "carol@example.com" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolver =
            EmailResolver::new(PeopleClient::with_client(reqwest::Client::new(), &server.uri()));

        assert_eq!(resolver.resolve("token-a", "people/42").await, "people/42");
        assert_eq!(resolver.resolve("token-b", "people/42").await, "carol@example.com");
    }

    #[tokio::test]
    async fn test_resolver_falls_back_to_name_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/9"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let resolver =
            EmailResolver::new(PeopleClient::with_client(reqwest::Client::new(), &server.uri()));

        assert_eq!(resolver.resolve("t", "people/9").await, "people/9");
    }

    #[tokio::test]
    async fn test_resolver_passes_through_non_person_names() {
        let resolver = EmailResolver::new(PeopleClient::new("http://127.0.0.1:9"));
        assert_eq!(resolver.resolve("t", "alice@example.com").await, "alice@example.com");
    }
}
