//! HTML rendering for the tree pages.
//!
//! Every value taken from a node or a form goes through [`escape`].

use axum::http::StatusCode;
use treegraph_core::{TreeNode, TreeNodeForm};

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title} - TreeGraph</title>\n\
         </head>\n\
         <body>\n\
         <h1><a href=\"/\">TreeGraph</a></h1>\n\
         {body}\
         </body>\n\
         </html>\n",
        title = escape(title),
        body = body,
    )
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>\n", escape(e)))
        .collect();
    format!("<ul class=\"errors\">\n{}</ul>\n", items)
}

fn uuid_of(node: &TreeNode) -> String {
    escape(node.uuid.as_deref().unwrap_or_default())
}

fn timestamp(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map(|dt| dt.to_rfc3339()).unwrap_or_default()
}

/// Index: the tree in pre-order with depth markers, or a link to create it
pub fn index_page(ordered: &[&TreeNode], stored: usize) -> String {
    let body = if ordered.is_empty() {
        "<p>No tree yet. <a href=\"/node\">Create the root node</a></p>\n".to_string()
    } else {
        let rows: String = ordered
            .iter()
            .map(|node| {
                let uuid = uuid_of(node);
                format!(
                    "<li>{marker} <a href=\"/node/{uuid}\">{name}</a> \
                     <a href=\"/node/{uuid}/add\">add child</a> \
                     <a href=\"/node/{uuid}/remove\">remove</a></li>\n",
                    marker = node.depth_marker(),
                    uuid = uuid,
                    name = escape(node.name()),
                )
            })
            .collect();
        format!(
            "<ul class=\"tree\">\n{}</ul>\n<p>{} nodes stored</p>\n",
            rows, stored
        )
    };
    layout("Tree", &body)
}

/// Form for the root node of a new tree
pub fn create_tree_page(form: &TreeNodeForm, errors: &[String]) -> String {
    let body = format!(
        "<h2>Create tree</h2>\n\
         {errors}\
         <form method=\"post\" action=\"/node\">\n\
         <label for=\"name\">Name</label>\n\
         <input type=\"text\" id=\"name\" name=\"name\" value=\"{name}\">\n\
         <button type=\"submit\">Create</button>\n\
         </form>\n",
        errors = error_list(errors),
        name = escape(form.name()),
    );
    layout("Create tree", &body)
}

/// Edit page for one node, optionally with the add-child form open
pub struct EditNodePage<'a> {
    pub node: &'a TreeNode,
    pub children: &'a [TreeNode],
    pub form: &'a TreeNodeForm,
    pub errors: &'a [String],
    /// Present when the add-child form is shown
    pub child_form: Option<&'a TreeNodeForm>,
    pub child_errors: &'a [String],
}

impl EditNodePage<'_> {
    pub fn render(&self) -> String {
        let node = self.node;
        let uuid = uuid_of(node);

        let details = format!(
            "<dl>\n\
             <dt>Node id</dt><dd>{node_id}</dd>\n\
             <dt>UUID</dt><dd>{uuid}</dd>\n\
             <dt>Created</dt><dd>{created}</dd>\n\
             <dt>Last modified</dt><dd>{modified}</dd>\n\
             <dt>Parent</dt><dd>{parent}</dd>\n\
             <dt>Root</dt><dd>{is_root}</dd>\n\
             </dl>\n",
            node_id = node.node_id.map(|id| id.to_string()).unwrap_or_default(),
            uuid = uuid,
            created = timestamp(node.created_date),
            modified = timestamp(node.last_modified_date),
            parent = escape(node.parent_name()),
            is_root = node.is_root(),
        );

        let edit_form = format!(
            "{errors}\
             <form method=\"post\" action=\"/node/{uuid}\">\n\
             <label for=\"name\">Name</label>\n\
             <input type=\"text\" id=\"name\" name=\"name\" value=\"{name}\">\n\
             <button type=\"submit\">Save</button>\n\
             </form>\n",
            errors = error_list(self.errors),
            uuid = uuid,
            name = escape(self.form.name()),
        );

        let children = if self.children.is_empty() {
            "<p>No children</p>\n".to_string()
        } else {
            let items: String = self
                .children
                .iter()
                .map(|child| {
                    let child_uuid = uuid_of(child);
                    format!(
                        "<li><a href=\"/node/{child_uuid}\">{name}</a> \
                         <a href=\"/node/{child_uuid}/remove\">remove</a></li>\n",
                        child_uuid = child_uuid,
                        name = escape(child.name()),
                    )
                })
                .collect();
            format!("<ul class=\"children\">\n{}</ul>\n", items)
        };

        let add_child = match self.child_form {
            Some(child_form) => format!(
                "<h3>Add child</h3>\n\
                 {errors}\
                 <form method=\"post\" action=\"/node/{uuid}/add\">\n\
                 <label for=\"child-name\">Name</label>\n\
                 <input type=\"text\" id=\"child-name\" name=\"name\" value=\"{name}\">\n\
                 <button type=\"submit\">Add</button>\n\
                 </form>\n",
                errors = error_list(self.child_errors),
                uuid = uuid,
                name = escape(child_form.name()),
            ),
            None => format!("<p><a href=\"/node/{}/add\">Add child</a></p>\n", uuid),
        };

        let remove_label = if node.is_root() { "Delete tree" } else { "Remove node" };
        let body = format!(
            "<h2>{name}</h2>\n{details}{edit_form}<h3>Children</h3>\n{children}{add_child}\
             <p><a href=\"/node/{uuid}/remove\">{remove_label}</a></p>\n",
            name = escape(node.name()),
            details = details,
            edit_form = edit_form,
            children = children,
            add_child = add_child,
            uuid = uuid,
            remove_label = remove_label,
        );
        layout(node.name(), &body)
    }
}

/// Error page shown for failed requests
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h2>{status}</h2>\n<p class=\"error\">{message}</p>\n<p><a href=\"/\">Back to the tree</a></p>\n",
        status = escape(&status.to_string()),
        message = escape(message),
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_empty_index_links_to_create_form() {
        let html = index_page(&[], 0);
        assert!(html.contains("href=\"/node\""));
    }

    #[test]
    fn test_index_lists_nodes_with_markers() {
        let mut root = TreeNode::new("root").with_depth(0);
        root.add_child(TreeNode::new("<child>"));

        let html = index_page(&root.pre_order(), 2);

        assert!(html.contains("* <a href=\"/node/\">root</a>"));
        assert!(html.contains("** <a href=\"/node/\">&lt;child&gt;</a>"));
        assert!(!html.contains("<child>"));
    }

    #[test]
    fn test_create_page_shows_errors() {
        let errors = vec!["You must provide at least a name for a TreeNode".to_string()];
        let html = create_tree_page(&TreeNodeForm::default(), &errors);
        assert!(html.contains("You must provide at least a name for a TreeNode"));
        assert!(html.contains("action=\"/node\""));
    }

    #[test]
    fn test_edit_page_toggles_add_child_form() {
        let node = TreeNode::new("leaf");
        let form = TreeNodeForm::from_node(&node);
        let mut page = EditNodePage {
            node: &node,
            children: &[],
            form: &form,
            errors: &[],
            child_form: None,
            child_errors: &[],
        };
        assert!(!page.render().contains("id=\"child-name\""));
        assert!(page.render().contains("Delete tree"));

        let child_form = TreeNodeForm::default();
        page.child_form = Some(&child_form);
        let html = page.render();
        assert!(html.contains("id=\"child-name\""));
        assert!(html.contains("<dt>Parent</dt><dd>null</dd>"));
    }
}
