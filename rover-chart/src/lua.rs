use crate::adapter::ChartAdapter;
use crate::element::HostElement;
use crate::error::Result;
use crate::geometry::Rect;
use anyhow::anyhow;
use mlua::{Function, Lua, LuaSerdeExt, RegistryKey, Table, Value};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

/// Handle to a chart instance created by a Lua `init`
///
/// Wraps whatever `init` returned, pinned in the Lua registry until
/// `destroy` releases it.
pub struct LuaChartHandle {
    key: RegistryKey,
}

/// Chart adapter backed by a Lua table of functions
///
/// ```lua
/// return {
///   init = function(element, data, settings) return { ... } end,
///   update = function(chart, data, settings) end,
///   resize = function(chart, data, size) end, -- optional
///   destroy = function(chart) end,            -- optional
/// }
/// ```
///
/// Elements are passed as `{ width, height }`; data and settings go through
/// the serde bridge, so JSON `null` arrives as `mlua`'s null sentinel.
pub struct LuaChartAdapter<E> {
    lua: Lua,
    init: RegistryKey,
    update: RegistryKey,
    resize: Option<RegistryKey>,
    destroy: Option<RegistryKey>,
    _element: PhantomData<fn(&E)>,
}

impl<E> LuaChartAdapter<E> {
    /// Evaluate `script` and build an adapter from the table it returns
    pub fn load(lua: Lua, script: &str) -> Result<Self> {
        let table: Table = lua.load(script).set_name("chart adapter").eval()?;
        Self::from_table(lua, table)
    }

    pub fn from_table(lua: Lua, table: Table) -> Result<Self> {
        let init: Function = table.get("init")?;
        let update: Function = table.get("update")?;
        let resize: Option<Function> = table.get("resize")?;
        let destroy: Option<Function> = table.get("destroy")?;

        let init = lua.create_registry_value(init)?;
        let update = lua.create_registry_value(update)?;
        let resize = resize.map(|f| lua.create_registry_value(f)).transpose()?;
        let destroy = destroy.map(|f| lua.create_registry_value(f)).transpose()?;

        Ok(Self {
            lua,
            init,
            update,
            resize,
            destroy,
            _element: PhantomData,
        })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    fn function(&self, key: &RegistryKey, name: &str) -> anyhow::Result<Function> {
        self.lua
            .registry_value(key)
            .map_err(|e| anyhow!("Failed to get chart '{}' function: {}", name, e))
    }

    fn json(&self, value: &JsonValue) -> anyhow::Result<Value> {
        self.lua
            .to_value(value)
            .map_err(|e| anyhow!("Failed to convert chart value: {}", e))
    }

    fn settings(&self, settings: Option<&JsonValue>) -> anyhow::Result<Value> {
        match settings {
            Some(settings) => self.json(settings),
            None => Ok(Value::Nil),
        }
    }

    fn rect(&self, rect: Rect) -> anyhow::Result<Value> {
        self.lua
            .to_value(&rect)
            .map_err(|e| anyhow!("Failed to convert element size: {}", e))
    }

    fn call_destroy(&self, key: &RegistryKey, handle: &LuaChartHandle) -> anyhow::Result<()> {
        let destroy = self.function(key, "destroy")?;
        let chart = self.handle_value(handle)?;
        destroy
            .call::<()>(chart)
            .map_err(|e| anyhow!("Lua chart destroy failed: {}", e))
    }

    fn handle_value(&self, handle: &LuaChartHandle) -> anyhow::Result<Value> {
        self.lua
            .registry_value(&handle.key)
            .map_err(|e| anyhow!("Stale chart handle: {}", e))
    }
}

impl<E: HostElement> ChartAdapter for LuaChartAdapter<E> {
    type Element = E;
    type Handle = LuaChartHandle;
    type Data = JsonValue;
    type Settings = JsonValue;

    fn init(
        &mut self,
        element: &E,
        data: &JsonValue,
        settings: Option<&JsonValue>,
    ) -> anyhow::Result<LuaChartHandle> {
        let init = self.function(&self.init, "init")?;
        let element = self.rect(element.bounding_rect().sanitized())?;
        let data = self.json(data)?;
        let settings = self.settings(settings)?;

        let chart: Value = init
            .call((element, data, settings))
            .map_err(|e| anyhow!("Lua chart init failed: {}", e))?;
        let key = self
            .lua
            .create_registry_value(chart)
            .map_err(|e| anyhow!("Failed to store chart handle: {}", e))?;
        Ok(LuaChartHandle { key })
    }

    fn update(
        &mut self,
        handle: &mut LuaChartHandle,
        data: &JsonValue,
        settings: Option<&JsonValue>,
    ) -> anyhow::Result<()> {
        let update = self.function(&self.update, "update")?;
        let chart = self.handle_value(handle)?;
        let data = self.json(data)?;
        let settings = self.settings(settings)?;

        update
            .call::<()>((chart, data, settings))
            .map_err(|e| anyhow!("Lua chart update failed: {}", e))
    }

    fn resize(
        &mut self,
        handle: &mut LuaChartHandle,
        data: &JsonValue,
        size: Option<Rect>,
    ) -> anyhow::Result<()> {
        let Some(key) = &self.resize else {
            return Ok(());
        };
        let resize = self.function(key, "resize")?;
        let chart = self.handle_value(handle)?;
        let data = self.json(data)?;
        let size = match size {
            Some(rect) => self.rect(rect)?,
            None => Value::Nil,
        };

        resize
            .call::<()>((chart, data, size))
            .map_err(|e| anyhow!("Lua chart resize failed: {}", e))
    }

    fn destroy(&mut self, handle: LuaChartHandle) -> anyhow::Result<()> {
        let result = match &self.destroy {
            Some(key) => self.call_destroy(key, &handle),
            None => Ok(()),
        };

        // Released whether or not the script's destroy succeeded
        self.lua
            .remove_registry_value(handle.key)
            .map_err(|e| anyhow!("Failed to release chart handle: {}", e))?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, PartialEq)]
    struct Canvas(Rect);

    impl HostElement for Canvas {
        fn bounding_rect(&self) -> Rect {
            self.0
        }
    }

    const SCRIPT: &str = r#"
        log = {}
        return {
            init = function(el, data, settings)
                table.insert(log, "init " .. math.floor(el.width) .. "x" .. math.floor(el.height) .. " " .. #data.points)
                return { id = 7 }
            end,
            update = function(chart, data, settings)
                table.insert(log, "update " .. chart.id .. " " .. #data.points .. " " .. settings.theme)
            end,
            resize = function(chart, data, size)
                table.insert(log, "resize " .. chart.id .. " " .. math.floor(size.width))
            end,
            destroy = function(chart)
                table.insert(log, "destroy " .. chart.id)
            end,
        }
    "#;

    fn log(adapter: &LuaChartAdapter<Canvas>) -> Vec<String> {
        adapter.lua().globals().get("log").unwrap()
    }

    #[test]
    fn test_lua_adapter_drives_script_functions() {
        let mut adapter = LuaChartAdapter::load(Lua::new(), SCRIPT).unwrap();
        let canvas = Canvas(Rect::new(400.0, 300.0));
        let data = json!({ "points": [1, 2, 3] });
        let settings = json!({ "theme": "dark" });

        let mut handle = adapter.init(&canvas, &data, Some(&settings)).unwrap();
        adapter.update(&mut handle, &json!({ "points": [1] }), Some(&settings)).unwrap();
        adapter
            .resize(&mut handle, &data, Some(Rect::new(800.0, 300.0)))
            .unwrap();
        adapter.destroy(handle).unwrap();

        assert_eq!(
            log(&adapter),
            vec!["init 400x300 3", "update 7 1 dark", "resize 7 800", "destroy 7"]
        );
    }

    #[test]
    fn test_optional_functions_may_be_missing() {
        let script = r#"
            return {
                init = function() return 1 end,
                update = function() end,
            }
        "#;
        let mut adapter: LuaChartAdapter<Canvas> = LuaChartAdapter::load(Lua::new(), script).unwrap();
        let canvas = Canvas(Rect::ZERO);

        let mut handle = adapter.init(&canvas, &json!(null), None).unwrap();
        adapter.resize(&mut handle, &json!(null), None).unwrap();
        adapter.destroy(handle).unwrap();
    }

    #[test]
    fn test_missing_update_is_rejected() {
        let script = "return { init = function() return 1 end }";
        let result = LuaChartAdapter::<Canvas>::load(Lua::new(), script);
        assert!(result.is_err());
    }

    #[test]
    fn test_failing_destroy_still_releases_handle() {
        let script = r#"
            live = setmetatable({}, { __mode = "v" })
            return {
                init = function()
                    local chart = { id = 1 }
                    live[1] = chart
                    return chart
                end,
                update = function() end,
                destroy = function() error("teardown failed") end,
            }
        "#;
        let mut adapter: LuaChartAdapter<Canvas> = LuaChartAdapter::load(Lua::new(), script).unwrap();
        let handle = adapter.init(&Canvas(Rect::ZERO), &json!({}), None).unwrap();

        let err = adapter.destroy(handle).unwrap_err();
        assert!(err.to_string().contains("teardown failed"));

        // Nothing pins the chart table once its registry slot is gone
        adapter.lua().gc_collect().unwrap();
        adapter.lua().gc_collect().unwrap();
        let remaining: usize = adapter.lua().load("return #live").eval().unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_lua_error_surfaces_as_anyhow() {
        let script = r#"
            return {
                init = function() error("no canvas") end,
                update = function() end,
            }
        "#;
        let mut adapter: LuaChartAdapter<Canvas> = LuaChartAdapter::load(Lua::new(), script).unwrap();
        let err = adapter
            .init(&Canvas(Rect::ZERO), &json!({}), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("no canvas"));
    }
}
