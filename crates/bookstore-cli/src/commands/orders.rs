use bookstore_access::{Capability, Denial, Mutation, ResourceContext, redirect_after};
use bookstore_api_models::OrderRequest;

use crate::cli::{IdArgs, OrderEditArgs, OrderPlaceArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_order_detail, render_order_list};

pub(crate) async fn handle_order_list(ctx: &AppContext) -> CliResult<String> {
    let page = ctx
        .controller()
        .load(ResourceContext::OrderList, ctx.api.list_orders())
        .await?;
    render_order_list(&page, ctx.output)
}

pub(crate) async fn handle_order_mine(ctx: &AppContext) -> CliResult<String> {
    let page = ctx
        .controller()
        .load(ResourceContext::OrderList, ctx.api.my_orders())
        .await?;
    render_order_list(&page, ctx.output)
}

pub(crate) async fn handle_order_show(ctx: &AppContext, args: IdArgs) -> CliResult<String> {
    let page = ctx
        .controller()
        .load(ResourceContext::OrderDetail, ctx.api.get_order(args.id))
        .await?;
    render_order_detail(&page, ctx.output)
}

/// Ordering is offered from the book page, so the book page's capabilities decide.
pub(crate) async fn handle_order_place(ctx: &AppContext, args: OrderPlaceArgs) -> CliResult<String> {
    let page = ctx.controller().enter(ResourceContext::BookDetail).await?;
    if !page.capabilities.contains(Capability::PlaceOrder) {
        let denial = if page.identity.is_identified() {
            Denial::access_denied()
        } else {
            Denial::login_required()
        };
        return Err(denial.into());
    }

    let request = OrderRequest::new(args.book_ids)?;
    let order = ctx.api.create_order(&request).await?;
    tracing::info!(order_id = order.id, books = request.book_ids.len(), "order placed");
    Ok(format!(
        "Order {} placed. Redirecting to {}",
        order.id,
        redirect_after(Mutation::PlaceOrder)
    ))
}

pub(crate) async fn handle_order_edit(ctx: &AppContext, args: OrderEditArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::OrderMutation).await?;

    let request = OrderRequest::new(args.book_ids)?;
    let record = ctx.api.update_order(args.id, &request).await?;
    tracing::info!(order_id = record.id, "order updated");
    Ok(format!(
        "Order {} updated. Redirecting to {}",
        record.id,
        redirect_after(Mutation::EditOrder)
    ))
}

pub(crate) async fn handle_order_delete(ctx: &AppContext, args: IdArgs) -> CliResult<String> {
    ctx.controller().enter(ResourceContext::OrderMutation).await?;

    ctx.api.delete_order(args.id).await?;
    tracing::info!(order_id = args.id, "order deleted");
    Ok(format!(
        "Order {} deleted. Redirecting to {}",
        args.id,
        redirect_after(Mutation::DeleteOrder)
    ))
}
