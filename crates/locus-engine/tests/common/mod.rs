#![allow(dead_code)]

use locus_engine::common::NodeSnapshot;
use locus_engine::{DocumentTree, NodeId, PageSnapshot};

/// ```text
/// [0] div#root
///   [1] form#login-form
///     [2] input[type="text"][placeholder="Username"]
///     [3] input[type="password"][placeholder="Password"]
///     [4] button.btn[type="submit"] "Log in"
///   [5] form#signup-form
///     [6] input[name="email"][data-testid="signup-email"][type="email"]
///     [7] button#signup.btn[type="submit"] "Sign up"
///   [8] a[href="/help"] "Need help?"
/// ```
pub fn login_page() -> PageSnapshot {
    login_page_with_signup(signup_button())
}

pub fn signup_button() -> NodeSnapshot {
    NodeSnapshot::element("button")
        .attr("id", "signup")
        .attr("class", "btn")
        .attr("type", "submit")
        .text("Sign up")
}

pub fn login_page_with_signup(signup: NodeSnapshot) -> PageSnapshot {
    PageSnapshot::new(
        NodeSnapshot::element("div").attr("id", "root").children([
            NodeSnapshot::element("form").attr("id", "login-form").children([
                NodeSnapshot::element("input")
                    .attr("type", "text")
                    .attr("placeholder", "Username"),
                NodeSnapshot::element("input")
                    .attr("type", "password")
                    .attr("placeholder", "Password"),
                NodeSnapshot::element("button")
                    .attr("class", "btn")
                    .attr("type", "submit")
                    .text("Log in"),
            ]),
            NodeSnapshot::element("form").attr("id", "signup-form").children([
                NodeSnapshot::element("input")
                    .attr("type", "email")
                    .attr("name", "email")
                    .attr("data-testid", "signup-email"),
                signup,
            ]),
            NodeSnapshot::element("a").attr("href", "/help").text("Need help?"),
        ]),
    )
    .with_url("https://example.test/login")
    .with_title("Login")
}

pub fn tree() -> DocumentTree {
    DocumentTree::from_snapshot(&login_page())
}

/// Id of the first node (pre-order) whose attribute `name` equals `value`.
pub fn find(tree: &DocumentTree, name: &str, value: &str) -> NodeId {
    tree.subtree(tree.root().unwrap().id())
        .unwrap()
        .map(Result::unwrap)
        .find(|n| n.attribute(name) == Some(value))
        .unwrap_or_else(|| panic!("fixture has no node with {}={}", name, value))
        .id()
}

/// Id of the `n`th node (pre-order) with the given tag.
pub fn nth_tag(tree: &DocumentTree, tag: &str, n: usize) -> NodeId {
    tree.subtree(tree.root().unwrap().id())
        .unwrap()
        .map(Result::unwrap)
        .filter(|node| node.tag() == tag)
        .nth(n)
        .unwrap_or_else(|| panic!("fixture has no {} #{}", tag, n))
        .id()
}
