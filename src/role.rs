use std::fmt;

/// Semantic role attached to a registered element type. The source built
/// role strings by walking a subclass chain; a closed enum with a fixed
/// token per variant covers the same surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Alert,
    Button,
    Checkbox,
    Dialog,
    Group,
    Heading,
    Link,
    List,
    ListItem,
    Option,
    Radio,
    RadioGroup,
    Tab,
    TabList,
    TabPanel,
    TextBox,
    ToolBar,
    Tree,
    TreeItem,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Dialog => "dialog",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::Link => "link",
            Self::List => "list",
            Self::ListItem => "listitem",
            Self::Option => "option",
            Self::Radio => "radio",
            Self::RadioGroup => "radiogroup",
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::TextBox => "textbox",
            Self::ToolBar => "toolbar",
            Self::Tree => "tree",
            Self::TreeItem => "treeitem",
        }
    }

    /// Space-joined role token list, the value of the `role` attribute.
    pub fn join(roles: &[Role]) -> String {
        roles
            .iter()
            .map(|role| role.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
