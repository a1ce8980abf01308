use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};

/// Extension key for storing extracted IP address
#[derive(Clone, Debug)]
pub struct ClientIp(pub IpAddr);

/// Middleware to extract client IP address from request
///
/// Priority:
/// 1. X-Forwarded-For header (for requests through proxies)
/// 2. X-Real-IP header (for Nginx)
/// 3. ConnectInfo socket address (direct connection, absent in router tests)
pub async fn extract_client_ip(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers(), connect_info.map(|ConnectInfo(addr)| addr));

    if let Some(ip) = ip {
        request.extensions_mut().insert(ClientIp(ip));
    }

    next.run(request).await
}

fn client_ip(headers: &axum::http::HeaderMap, socket: Option<SocketAddr>) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        // Comma-separated list, first entry is the original client
        forwarded
            .to_str()
            .ok()
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    } else if let Some(real_ip) = headers.get("x-real-ip") {
        real_ip.to_str().ok().and_then(|s| s.trim().parse::<IpAddr>().ok())
    } else {
        socket.map(|addr| addr.ip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let socket: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        assert_eq!(
            client_ip(&headers, Some(socket)),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_real_ip_then_socket() {
        let mut headers = HeaderMap::new();
        let socket: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(socket)), Some(socket.ip()));

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(
            client_ip(&headers, Some(socket)),
            Some("198.51.100.2".parse().unwrap())
        );
    }

    #[test]
    fn test_garbage_header_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers, None), None);
    }
}
