use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    tasks::{AddTaskForm, TaskIdForm, TaskService, UpdateTaskForm},
    views,
};
use actix_web::{get, post, web, HttpResponse};

// Every handler takes `AuthenticatedUser` first, so anonymous requests are redirected to
// the login form before the body is read.

/// The main page: the user's tasks in insertion order.
#[get("/")]
pub async fn index(
    user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
) -> Result<HttpResponse, AppError> {
    let list = tasks.list_tasks(user.0).await?;

    let mut context = views::context(true);
    context.insert("tasks", &list);
    views::render("index.html", &context)
}

#[get("/add_task")]
pub async fn add_task_form(_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    views::render("add_task.html", &views::context(true))
}

/// Creates a task from the `add_task`, `deadline` and `date` fields.
#[post("/add_task")]
pub async fn add_task(
    user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
    form: web::Form<AddTaskForm>,
) -> Result<HttpResponse, AppError> {
    tasks.add_task(user.0, &form).await?;
    Ok(views::redirect("/"))
}

#[post("/delete_task")]
pub async fn delete_task(
    user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
    form: web::Form<TaskIdForm>,
) -> Result<HttpResponse, AppError> {
    tasks.delete_task(user.0, form.task_id).await?;
    Ok(views::redirect("/"))
}

/// Flips the completion flag of `task_id`.
#[post("/task_completion")]
pub async fn task_completion(
    user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
    form: web::Form<TaskIdForm>,
) -> Result<HttpResponse, AppError> {
    tasks.toggle_completion(user.0, form.task_id).await?;
    Ok(views::redirect("/"))
}

/// Renders the edit form from the stored task.
#[post("/edit_task")]
pub async fn edit_task(
    user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
    form: web::Form<TaskIdForm>,
) -> Result<HttpResponse, AppError> {
    let view = tasks.prepare_edit(user.0, form.task_id).await?;

    let mut context = views::context(true);
    context.insert("task", &view);
    views::render("edit_task.html", &context)
}

#[post("/update_task")]
pub async fn update_task(
    user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
    form: web::Form<UpdateTaskForm>,
) -> Result<HttpResponse, AppError> {
    tasks.update_task(user.0, &form).await?;
    Ok(views::redirect("/"))
}
