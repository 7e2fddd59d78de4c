mod common;

use clipanda::{PandaError, Session};
use common::Harness;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn login_page(action: &str) -> String {
    format!(
        r#"<html><body>
<form id="fm1" class="fm-v clearfix" action="{action}" method="post">
  <input id="username" name="username" type="text" value="" />
  <input type="hidden" name="lt" value="LT-42-abcXYZ-cas" />
</form></body></html>"#
    )
}

fn mount_login_page(h: &Harness) {
    h.block_on(
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .and(query_param(
                "service",
                format!("{}/sakai-login-tool/container", h.uri()),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(login_page("/cas/login?service=panda")),
            )
            .expect(1)
            .mount(&h.server),
    );
}

fn redirect(to: &str, cookie: &str) -> ResponseTemplate {
    ResponseTemplate::new(302)
        .insert_header("location", to)
        .insert_header("set-cookie", cookie)
}

#[test]
fn login_posts_form_and_takes_cookie_of_second_hop() {
    let h = Harness::start();
    mount_login_page(&h);
    h.block_on(async {
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .respond_with(redirect(
                &format!("{}/sakai-login-tool/container?ticket=ST-1", h.uri()),
                "CASTGC=granting; Path=/cas",
            ))
            .expect(1)
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sakai-login-tool/container"))
            .respond_with(redirect("/portal", "JSESSIONID=panda-session; Path=/"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/portal"))
            .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
            .mount(&h.server)
            .await;
    });

    let session = Session::login(&h.config(), "a0123456", "s3cret").unwrap();
    assert_eq!(session.to_string(), "JSESSIONID=panda-session;");

    let requests = h.block_on(h.server.received_requests()).unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    assert_eq!(post.url.query(), Some("service=panda"));
    let fields: Vec<(String, String)> = url::form_urlencoded::parse(&post.body)
        .into_owned()
        .collect();
    let expected = [
        ("lt", "LT-42-abcXYZ-cas"),
        ("password", "s3cret"),
        ("username", "a0123456"),
        ("execution", "e1s1"),
        ("_eventId", "submit"),
        ("submit", "LOGIN"),
    ];
    assert_eq!(
        fields,
        expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
    );
}

#[test]
fn login_without_redirect_fails() {
    let h = Harness::start();
    mount_login_page(&h);
    h.block_on(
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("bad credentials"))
            .mount(&h.server),
    );

    let err = Session::login(&h.config(), "a0123456", "wrong").unwrap_err();
    assert!(matches!(err, PandaError::LoginFailed));
}

#[test]
fn login_with_three_hops_fails() {
    let h = Harness::start();
    mount_login_page(&h);
    h.block_on(async {
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(redirect("/one", "a=1"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/one"))
            .respond_with(redirect("/two", "b=2"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/two"))
            .respond_with(redirect("/three", "c=3"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/three"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&h.server)
            .await;
    });

    let err = Session::login(&h.config(), "a0123456", "s3cret").unwrap_err();
    assert!(matches!(err, PandaError::LoginFailed));
}

#[test]
fn login_page_without_ticket_is_a_scrape_error() {
    let h = Harness::start();
    h.block_on(
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&h.server),
    );

    let err = Session::login(&h.config(), "a0123456", "s3cret").unwrap_err();
    assert!(matches!(err, PandaError::Scrape(_)));
}

#[test]
fn login_redirect_loop_fails() {
    let h = Harness::start();
    mount_login_page(&h);
    h.block_on(async {
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(redirect("/loop", "CASTGC=granting"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(redirect("/loop", "JSESSIONID=again"))
            .mount(&h.server)
            .await;
    });

    let err = Session::login(&h.config(), "a0123456", "s3cret").unwrap_err();
    assert!(matches!(err, PandaError::LoginFailed));

    let loops = h
        .block_on(h.server.received_requests())
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/loop")
        .count();
    assert_eq!(loops, clipanda::session::MAX_HOPS);
}

#[test]
fn login_second_hop_without_cookie_fails() {
    let h = Harness::start();
    mount_login_page(&h);
    h.block_on(async {
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(redirect("/a", "CASTGC=granting"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/b"))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&h.server)
            .await;
    });

    let err = Session::login(&h.config(), "a0123456", "s3cret").unwrap_err();
    assert!(matches!(err, PandaError::LoginFailed));
}
