use adapter::{sign, signer::X_SIGNATURE, signer::X_TIMESTAMP, Credentials, Method, Timestamp};
use primitives::{
    profile::SignatureScope,
    test_util::{discard_logger, test_config, DUMMY_API_KEY, DUMMY_CUSTOMER_ID, DUMMY_SECRET_KEY},
};
use wiremock::{MockServer, Request};

use crate::{searchad_interface::signed_path, SearchAdApi};

pub fn dummy_credentials() -> Credentials {
    Credentials::new(DUMMY_API_KEY, DUMMY_CUSTOMER_ID, DUMMY_SECRET_KEY)
        .expect("Dummy credentials are valid")
}

pub fn setup_api(server: &MockServer) -> SearchAdApi {
    let config = test_config(&server.uri());

    SearchAdApi::from_config(&config, dummy_credentials(), discard_logger())
        .expect("Should build SearchAdApi")
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .iter()
        .find(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.iter().next().map(|value| value.as_str().to_string()))
}

pub fn timestamp_header(request: &Request) -> Option<Timestamp> {
    header_value(request, X_TIMESTAMP)
        .and_then(|timestamp| timestamp.parse::<i64>().ok())
        .map(Timestamp::from_millis)
}

/// Matches only requests signed with the dummy secret key over the request line,
/// the way the remote verifies them.
pub fn signature_is_valid(scope: SignatureScope) -> impl Fn(&Request) -> bool + Send + Sync {
    move |request: &Request| {
        let method = match request.method.to_string().parse::<Method>() {
            Ok(method) => method,
            Err(_) => return false,
        };

        match (timestamp_header(request), header_value(request, X_SIGNATURE)) {
            (Some(timestamp), Some(signature)) => sign(
                timestamp,
                method,
                &signed_path(&request.url, scope),
                DUMMY_SECRET_KEY.as_bytes(),
            )
            .map(|expected| expected.as_str() == signature)
            .unwrap_or(false),
            _ => false,
        }
    }
}
