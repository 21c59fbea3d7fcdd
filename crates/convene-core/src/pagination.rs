//! Reusable pagination over the token mechanism
//!
//! [`Paginated`] composes onto any [`Action`] that presents a multi-page
//! list. The current page travels as the reserved `page` token argument;
//! prev/next controls are ordinary tokens with the `paginate` operation, and
//! [`Paginated::handle_pagination`] simply re-invokes the action's render
//! operation: pagination is a routed operation, never a special code path.

use async_trait::async_trait;
use convene_route::TokenArgs;

use crate::content::{Button, ControlRow, ControlStyle};
use crate::context::RequestContext;
use crate::error::NavError;
use crate::node::Action;

/// Reserved token argument carrying the zero-based page index
pub const PAGE_ARG: &str = "page";

/// Operation id the prev/next controls are bound to
pub const PAGINATE_OPERATION: &str = "paginate";

/// Items per page, the host protocol's cap on entries in one list control
pub const PAGE_SIZE: usize = 25;

/// Page-index plumbing for actions that render lists
///
/// Implementors provide the item source ([`Paginated::total_items`],
/// [`Paginated::items_for_page`]) and name the operation that renders a page
/// ([`Paginated::render_operation`]); everything else is provided.
#[async_trait]
pub trait Paginated: Action {
    /// The collaborator-owned item type being paged
    type Item: Send;

    /// Operation id that renders one page of items
    fn render_operation(&self) -> &str;

    /// Total number of items, derived from a collaborator at request time
    async fn total_items(&self, ctx: &RequestContext, args: &TokenArgs)
        -> Result<usize, NavError>;

    /// The slice `[page*PAGE_SIZE, (page+1)*PAGE_SIZE)` of a stably ordered
    /// collection
    async fn items_for_page(
        &self,
        ctx: &RequestContext,
        args: &TokenArgs,
        page: usize,
    ) -> Result<Vec<Self::Item>, NavError>;

    /// Page requested by the inbound token; absent means the first page
    fn current_page(&self, args: &TokenArgs) -> usize {
        args.get(PAGE_ARG)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// Total pages: `ceil(total_items / PAGE_SIZE)`
    async fn total_pages(&self, ctx: &RequestContext, args: &TokenArgs) -> Result<usize, NavError> {
        Ok(self.total_items(ctx, args).await?.div_ceil(PAGE_SIZE))
    }

    /// Clamp an out-of-range page index onto the last page
    ///
    /// A stale "next" token issued before the collection shrank should still
    /// land somewhere renderable.
    fn clamp_page(&self, page: usize, total_pages: usize) -> usize {
        if total_pages == 0 {
            0
        } else {
            page.min(total_pages - 1)
        }
    }

    /// Build the prev/next control row for the current position
    ///
    /// Both controls re-encode the full argument set with only `page`
    /// changed; "prev" is disabled on the first page, "next" on the last.
    ///
    /// # Errors
    /// Construction rules as in [`convene_route::RoutingToken::encode`].
    fn pagination_row(
        &self,
        args: &TokenArgs,
        current_page: usize,
        total_pages: usize,
    ) -> Result<ControlRow, NavError> {
        let token_for = |page: usize| -> Result<_, NavError> {
            let mut paged = args.clone();
            paged.set(PAGE_ARG, page.to_string())?;
            Ok(convene_route::RoutingToken::encode(
                self.path(),
                PAGINATE_OPERATION,
                &paged,
            )?)
        };

        let prev = Button::new(token_for(current_page.saturating_sub(1))?, "Previous")
            .with_style(ControlStyle::Secondary)
            .disabled(current_page == 0);
        let next = Button::new(token_for(current_page + 1)?, "Next")
            .with_style(ControlStyle::Secondary)
            .disabled(current_page + 1 >= total_pages);

        Ok(ControlRow::new().with(prev).with(next))
    }

    /// Handle an activated prev/next control
    ///
    /// Reads the target page from the token, clamps it, and re-invokes the
    /// render operation with the adjusted argument set.
    async fn handle_pagination(
        &self,
        ctx: &mut RequestContext,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        let total_pages = self.total_pages(ctx, args).await?;
        let page = self.clamp_page(self.current_page(args), total_pages);

        let mut forwarded = args.clone();
        forwarded.set(PAGE_ARG, page.to_string())?;
        self.handle_operation(ctx, self.render_operation(), &forwarded)
            .await
    }
}
