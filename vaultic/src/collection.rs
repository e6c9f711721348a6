//! Paged resource collections.
//!
//! A collection is one decoded page plus its cursors. Merging adjacent
//! pages keeps element order stable and adopts the incoming page's cursor
//! on the side it was fetched from, so a merged collection still knows
//! where to continue.

use thiserror::Error;

use crate::resource::Resource;

/// Errors raised while exhausting a paged listing.
#[derive(Debug, Error)]
pub enum PaginationError<E> {
    /// The page fetcher failed.
    #[error(transparent)]
    Resolver(E),

    /// More pages remained than the caller allowed.
    #[error("listing exceeded the page limit of {limit}")]
    PageLimitExceeded {
        /// The cap that was hit.
        limit: usize,
    },
}

/// One or more merged pages of resources, with pagination cursors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceCollection<T> {
    resources: Vec<T>,
    previous_uri: Option<String>,
    next_uri: Option<String>,
}

impl<T> ResourceCollection<T> {
    /// An empty collection with the given cursors.
    #[must_use]
    pub fn new(previous_uri: Option<String>, next_uri: Option<String>) -> Self {
        Self {
            resources: Vec::new(),
            previous_uri,
            next_uri,
        }
    }

    /// Appends a resource to the end of the collection.
    pub fn push(&mut self, resource: T) {
        self.resources.push(resource);
    }

    /// All resources, in page order.
    #[must_use]
    pub fn all(&self) -> &[T] {
        &self.resources
    }

    /// The resource at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.resources.get(index)
    }

    /// Number of resources held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the collection holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterates the resources in page order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.resources.iter()
    }

    /// Cursor to the page before this one, when the server provided one.
    #[must_use]
    pub fn previous_uri(&self) -> Option<&str> {
        self.previous_uri.as_deref()
    }

    /// Cursor to the page after this one, when the server provided one.
    #[must_use]
    pub fn next_uri(&self) -> Option<&str> {
        self.next_uri.as_deref()
    }

    /// Whether a previous page exists.
    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.previous_uri.is_some()
    }

    /// Whether a next page exists.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.next_uri.is_some()
    }

    /// Appends a page fetched through [`next_uri`](Self::next_uri) and
    /// adopts its forward cursor. The backward cursor is unchanged.
    pub fn merge_next_page(&mut self, page: Self) {
        self.resources.extend(page.resources);
        self.next_uri = page.next_uri;
    }

    /// Prepends a page fetched through
    /// [`previous_uri`](Self::previous_uri) and adopts its backward
    /// cursor. The forward cursor is unchanged.
    pub fn merge_previous_page(&mut self, page: Self) {
        self.resources.splice(0..0, page.resources);
        self.previous_uri = page.previous_uri;
    }

    /// Follows forward cursors until none remain, merging every page into
    /// this collection.
    ///
    /// `fetch_next` receives each forward cursor in turn and returns the
    /// page behind it. `max_pages` bounds the number of fetches so a
    /// server handing out cyclic cursors cannot loop forever.
    ///
    /// # Errors
    ///
    /// [`PaginationError::Resolver`] when a fetch fails;
    /// [`PaginationError::PageLimitExceeded`] when a forward cursor still
    /// remains after `max_pages` fetches.
    pub fn fetch_all<E>(
        &mut self,
        max_pages: usize,
        mut fetch_next: impl FnMut(&str) -> Result<Self, E>,
    ) -> Result<(), PaginationError<E>> {
        let mut fetched = 0;
        while let Some(next_uri) = self.next_uri.clone() {
            if fetched >= max_pages {
                return Err(PaginationError::PageLimitExceeded { limit: max_pages });
            }
            let page = fetch_next(&next_uri).map_err(PaginationError::Resolver)?;
            self.merge_next_page(page);
            fetched += 1;
        }
        Ok(())
    }
}

impl<T: Resource> ResourceCollection<T> {
    /// Id of the first resource, used as a `ending_before` cursor value.
    #[must_use]
    pub fn first_id(&self) -> Option<&str> {
        self.resources.first().and_then(Resource::id)
    }

    /// Id of the last resource, used as a `starting_after` cursor value.
    #[must_use]
    pub fn last_id(&self) -> Option<&str> {
        self.resources.last().and_then(Resource::id)
    }
}

impl<T> IntoIterator for ResourceCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResourceCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Account;

    fn page(ids: &[&str], previous: Option<&str>, next: Option<&str>) -> ResourceCollection<Account> {
        let mut collection =
            ResourceCollection::new(previous.map(str::to_owned), next.map(str::to_owned));
        for id in ids {
            collection.push(Account::reference(id));
        }
        collection
    }

    #[test]
    fn test_merge_next_page_appends_and_adopts_cursor() {
        let mut first = page(&["A1", "A2"], None, Some("/accounts?page=2"));
        let second = page(&["A3"], Some("/accounts?page=1"), Some("/accounts?page=3"));
        first.merge_next_page(second);

        let ids: Vec<_> = first.iter().filter_map(Resource::id).collect();
        assert_eq!(ids, ["A1", "A2", "A3"]);
        assert_eq!(first.next_uri(), Some("/accounts?page=3"));
        assert!(first.previous_uri().is_none());
    }

    #[test]
    fn test_merge_previous_page_prepends_and_adopts_cursor() {
        let mut second = page(&["A3", "A4"], Some("/accounts?page=1"), None);
        let first = page(&["A1", "A2"], None, Some("/accounts?page=2"));
        second.merge_previous_page(first);

        let ids: Vec<_> = second.iter().filter_map(Resource::id).collect();
        assert_eq!(ids, ["A1", "A2", "A3", "A4"]);
        assert!(second.previous_uri().is_none());
        assert!(second.next_uri().is_none());
    }

    #[test]
    fn test_fetch_all_follows_cursors_to_the_end() {
        let mut collection = page(&["A1"], None, Some("p2"));
        collection
            .fetch_all(10, |cursor| -> Result<_, std::convert::Infallible> {
                Ok(match cursor {
                    "p2" => page(&["A2"], Some("p1"), Some("p3")),
                    _ => page(&["A3"], Some("p2"), None),
                })
            })
            .unwrap();

        assert_eq!(collection.len(), 3);
        assert!(!collection.has_next_page());
        assert_eq!(collection.first_id(), Some("A1"));
        assert_eq!(collection.last_id(), Some("A3"));
    }

    #[test]
    fn test_fetch_all_enforces_page_cap() {
        let mut collection = page(&["A1"], None, Some("loop"));
        let result = collection.fetch_all(3, |_| -> Result<_, std::convert::Infallible> {
            Ok(page(&["X"], None, Some("loop")))
        });
        assert!(matches!(
            result,
            Err(PaginationError::PageLimitExceeded { limit: 3 })
        ));
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_fetch_all_surfaces_fetch_errors() {
        let mut collection = page(&["A1"], None, Some("p2"));
        let result = collection.fetch_all(10, |_| Err::<ResourceCollection<Account>, _>("boom"));
        assert!(matches!(result, Err(PaginationError::Resolver("boom"))));
    }
}
