//! Sidebar menu: a pure function of the current index and the titles.

use serde::Serialize;

use crate::route::page_href;

/// Where a menu entry sits relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Past,
    Current,
    Future,
}

impl Placement {
    /// Classify `index` against the page being shown.
    pub fn of(index: usize, current: i64) -> Self {
        let index = index as i64;
        if index == current {
            Self::Current
        } else if index > current {
            Self::Future
        } else {
            Self::Past
        }
    }
}

/// A single entry in the page list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub index: usize,
    pub title: String,
    pub placement: Placement,
    pub href: String,
}

/// Back or Next control. A control without a target is rendered muted and
/// does not navigate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub href: Option<String>,
}

impl Control {
    fn to(index: i64) -> Self {
        Self {
            href: usize::try_from(index).ok().map(page_href),
        }
    }

    fn disabled() -> Self {
        Self { href: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.href.is_some()
    }
}

/// Everything the menu template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    /// Workshop title shown above the list
    pub title: String,
    pub items: Vec<MenuItem>,
    pub back: Control,
    pub next: Control,
}

impl MenuView {
    pub fn new(title: &str, current: i64, titles: &[String]) -> Self {
        let last = titles.len() as i64 - 1;

        let items = titles
            .iter()
            .enumerate()
            .map(|(index, title)| MenuItem {
                index,
                title: title.clone(),
                placement: Placement::of(index, current),
                href: page_href(index),
            })
            .collect();

        let back = if current <= 0 {
            Control::disabled()
        } else {
            Control::to(current - 1)
        };

        let next = if current >= last {
            Control::disabled()
        } else {
            Control::to(current + 1)
        };

        Self {
            title: title.to_string(),
            items,
            back,
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles() -> Vec<String> {
        ["Intro", "Setup", "Build", "Ship"]
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    #[test]
    fn classifies_every_entry() {
        let titles = titles();
        for current in 0..titles.len() as i64 {
            let view = MenuView::new("Workshop", current, &titles);
            for item in &view.items {
                let expected = match (item.index as i64).cmp(&current) {
                    std::cmp::Ordering::Less => Placement::Past,
                    std::cmp::Ordering::Equal => Placement::Current,
                    std::cmp::Ordering::Greater => Placement::Future,
                };
                assert_eq!(item.placement, expected);
            }
        }
    }

    #[test]
    fn back_disabled_only_on_first_page() {
        let titles = titles();
        for current in 0..titles.len() as i64 {
            let view = MenuView::new("Workshop", current, &titles);
            assert_eq!(view.back.is_enabled(), current != 0);
        }

        let view = MenuView::new("Workshop", 2, &titles);
        assert_eq!(view.back.href.as_deref(), Some("#/1"));
    }

    #[test]
    fn next_disabled_only_on_last_page() {
        let titles = titles();
        for current in 0..titles.len() as i64 {
            let view = MenuView::new("Workshop", current, &titles);
            assert_eq!(view.next.is_enabled(), current != 3);
        }

        let view = MenuView::new("Workshop", 0, &titles);
        assert_eq!(view.next.href.as_deref(), Some("#/1"));
    }

    #[test]
    fn invalid_index_marks_everything_future() {
        let view = MenuView::new("Workshop", -1, &titles());

        assert!(view.items.iter().all(|i| i.placement == Placement::Future));
        assert!(!view.back.is_enabled());
        assert_eq!(view.next.href.as_deref(), Some("#/0"));
    }

    #[test]
    fn empty_titles_render_no_controls() {
        let view = MenuView::new("Workshop", -1, &[]);

        assert!(view.items.is_empty());
        assert!(!view.back.is_enabled());
        assert!(!view.next.is_enabled());
    }

    #[test]
    fn items_link_to_their_page() {
        let view = MenuView::new("Workshop", 1, &titles());

        assert_eq!(view.items[3].href, "#/3");
        assert_eq!(view.items[3].title, "Ship");
    }
}
